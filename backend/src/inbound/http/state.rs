//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain use cases and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::PatientAccounts;
use crate::domain::{CountryCode, IntakeForm, RegistrationService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn PatientAccounts>,
    pub intake: Arc<IntakeForm>,
    pub registration: RegistrationService,
}

impl HttpState {
    /// Wire the intake form and registration service over one accounts use
    /// case.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use patient_intake::domain::PatientAccountService;
    /// use patient_intake::domain::ports::FixtureIdentityDirectory;
    /// use patient_intake::inbound::http::state::HttpState;
    ///
    /// let accounts = PatientAccountService::new(Arc::new(FixtureIdentityDirectory::default()));
    /// let state = HttpState::new(Arc::new(accounts));
    /// let _intake = state.intake.clone();
    /// ```
    pub fn new(accounts: Arc<dyn PatientAccounts>) -> Self {
        Self::with_country(accounts, CountryCode::default())
    }

    /// Wire the handlers with `country` as the calling code for phone
    /// numbers entered without a leading `+`.
    pub fn with_country(accounts: Arc<dyn PatientAccounts>, country: CountryCode) -> Self {
        Self {
            intake: Arc::new(
                IntakeForm::new(Arc::clone(&accounts)).with_country(country.clone()),
            ),
            registration: RegistrationService::new(Arc::clone(&accounts)).with_country(country),
            accounts,
        }
    }
}
