//! Intake form submission.
//!
//! Validates the three intake fields, refuses a second submission for an
//! email while the first is still in flight, calls the create-user use case
//! and turns the outcome into the next client location.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, error};

use crate::domain::ports::{CreateUserFailure, CreateUserOutcome, PatientAccounts};
use crate::domain::{
    CountryCode, EmailAddress, FieldErrors, NewPatientUser, UserDataInput, UserRecord,
};

/// Result of submitting the intake form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Continue to the registration page for `record`.
    Navigate {
        /// The created or existing record.
        record: UserRecord,
        /// Whether the record already existed.
        existing: bool,
        /// Client path of the registration page.
        location: String,
    },
    /// One or more fields failed validation.
    Invalid(FieldErrors),
    /// A submission for this email is still running.
    AlreadySubmitting,
    /// The use case produced no record.
    Failed(CreateUserFailure),
}

/// Releases the in-flight mark for an email when dropped.
struct InFlight<'a> {
    pending: &'a Mutex<HashSet<EmailAddress>>,
    email: EmailAddress,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        match self.pending.lock() {
            Ok(mut pending) => {
                pending.remove(&self.email);
            }
            Err(poisoned) => {
                poisoned.into_inner().remove(&self.email);
            }
        }
    }
}

/// Intake form controller.
pub struct IntakeForm {
    accounts: Arc<dyn PatientAccounts>,
    country: CountryCode,
    pending: Mutex<HashSet<EmailAddress>>,
}

impl IntakeForm {
    /// Build a form over the accounts use case.
    pub fn new(accounts: Arc<dyn PatientAccounts>) -> Self {
        Self {
            accounts,
            country: CountryCode::default(),
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Use `country` for phone numbers entered without a calling code.
    #[must_use]
    pub fn with_country(mut self, country: CountryCode) -> Self {
        self.country = country;
        self
    }

    fn begin(&self, email: &EmailAddress) -> Option<InFlight<'_>> {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !pending.insert(email.clone()) {
            return None;
        }
        Some(InFlight {
            pending: &self.pending,
            email: email.clone(),
        })
    }

    /// Whether a submission for `email` is currently running.
    pub fn is_submitting(&self, email: &EmailAddress) -> bool {
        match self.pending.lock() {
            Ok(pending) => pending.contains(email),
            Err(poisoned) => poisoned.into_inner().contains(email),
        }
    }

    /// Submit the form.
    pub async fn submit(&self, input: &UserDataInput) -> SubmitOutcome {
        let user = match NewPatientUser::validate_with_country(input, &self.country) {
            Ok(user) => user,
            Err(errors) => return SubmitOutcome::Invalid(errors),
        };

        let Some(_in_flight) = self.begin(user.email()) else {
            debug!(email = %user.email(), "submission already in flight");
            return SubmitOutcome::AlreadySubmitting;
        };

        match self.accounts.create_user(&user).await {
            CreateUserOutcome::Created(record) => navigate(record, false),
            CreateUserOutcome::AlreadyExists(record) => navigate(record, true),
            CreateUserOutcome::Failed(failure) => {
                error!(?failure, "intake submission produced no user");
                SubmitOutcome::Failed(failure)
            }
        }
    }
}

fn navigate(record: UserRecord, existing: bool) -> SubmitOutcome {
    let location = record.registration_path();
    SubmitOutcome::Navigate {
        record,
        existing,
        location,
    }
}
