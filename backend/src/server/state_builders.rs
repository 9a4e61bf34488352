//! Builders for the accounts use case behind the HTTP state.

use std::sync::Arc;

use tracing::{info, warn};

use patient_intake::domain::PatientAccountService;
use patient_intake::domain::ports::{FixtureIdentityDirectory, PatientAccounts};
use patient_intake::outbound::identity::{IdentityHttpDirectory, IdentitySettings};

/// Pick the identity directory behind the accounts use case.
///
/// Uses the hosted users API when identity settings are present. Without
/// them, falls back to the in-memory fixture in debug builds or when
/// `allow_fixture` is set, and refuses to start otherwise.
///
/// # Errors
/// Returns [`std::io::Error`] when settings are partial or invalid, the HTTP
/// client cannot be built, or no directory is configured in a release build.
pub(crate) fn build_accounts(
    identity: &IdentitySettings,
    allow_fixture: bool,
) -> std::io::Result<Arc<dyn PatientAccounts>> {
    let connection = identity
        .connection()
        .map_err(|error| std::io::Error::other(error.to_string()))?;
    match connection {
        Some(connection) => {
            info!(endpoint = %connection.endpoint, "using hosted identity directory");
            let directory = IdentityHttpDirectory::new(connection).map_err(|error| {
                std::io::Error::other(format!("identity client construction failed: {error}"))
            })?;
            Ok(Arc::new(PatientAccountService::new(Arc::new(directory))))
        }
        None if allow_fixture || cfg!(debug_assertions) => {
            warn!("identity service not configured; using in-memory fixture directory");
            Ok(Arc::new(PatientAccountService::new(Arc::new(
                FixtureIdentityDirectory::default(),
            ))))
        }
        None => Err(std::io::Error::other(
            "identity service not configured: set IDENTITY_ENDPOINT, IDENTITY_PROJECT_ID and IDENTITY_API_KEY",
        )),
    }
}
