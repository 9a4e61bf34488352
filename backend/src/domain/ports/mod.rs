//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod identity_directory;
mod patient_accounts;

#[cfg(test)]
pub use identity_directory::MockIdentityDirectory;
pub use identity_directory::{FixtureIdentityDirectory, IdentityDirectory, IdentityDirectoryError};
#[cfg(test)]
pub use patient_accounts::MockPatientAccounts;
pub(crate) use patient_accounts::remote_error;
pub use patient_accounts::{CreateUserFailure, CreateUserOutcome, PatientAccounts};
