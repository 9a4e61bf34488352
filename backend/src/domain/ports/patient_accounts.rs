//! Driving port for the create-or-fetch user use case.
//!
//! Inbound adapters and the intake form talk to this port; the concrete
//! service lives in `domain::patient_accounts`.

use async_trait::async_trait;
use serde_json::json;

use super::IdentityDirectoryError;
use crate::domain::{EmailAddress, Error, NewPatientUser, UserRecord, UserRecordId};

/// Result of `create_user`.
///
/// A sum type so callers cannot confuse a swallowed failure with "no user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateUserOutcome {
    /// A new record was created.
    Created(UserRecord),
    /// The email was taken; this is the first record registered under it.
    AlreadyExists(UserRecord),
    /// Neither creation nor recovery produced a record.
    Failed(CreateUserFailure),
}

impl CreateUserOutcome {
    /// The record, when one was created or found.
    pub fn record(&self) -> Option<&UserRecord> {
        match self {
            Self::Created(record) | Self::AlreadyExists(record) => Some(record),
            Self::Failed(_) => None,
        }
    }

    /// Stable label used in responses and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::AlreadyExists(_) => "existing",
            Self::Failed(_) => "failed",
        }
    }
}

/// Why `create_user` produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateUserFailure {
    /// Creation failed for a reason other than a conflict. No lookup ran.
    Remote(IdentityDirectoryError),
    /// Creation conflicted but the email lookup matched nothing.
    ConflictUnresolved { email: EmailAddress },
    /// Creation conflicted and the email lookup itself failed.
    Lookup(IdentityDirectoryError),
}

impl CreateUserFailure {
    /// Map onto the transport-agnostic domain error.
    pub fn to_error(&self) -> Error {
        match self {
            Self::Remote(error) | Self::Lookup(error) => remote_error(error),
            Self::ConflictUnresolved { email } => {
                Error::conflict("email is already registered but no matching user was found")
                    .with_details(json!({
                        "field": "email",
                        "value": email,
                        "code": "conflict_unresolved",
                    }))
            }
        }
    }
}

/// Translate an identity failure for callers outside the domain.
pub(crate) fn remote_error(error: &IdentityDirectoryError) -> Error {
    if error.is_unavailable() {
        Error::service_unavailable(format!("identity service unavailable: {error}"))
    } else {
        Error::internal(format!("identity service error: {error}"))
    }
}

/// Use-case port for patient user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientAccounts: Send + Sync {
    /// Create a user, or return the existing one registered with the same
    /// email.
    async fn create_user(&self, user: &NewPatientUser) -> CreateUserOutcome;

    /// Fetch a user by id; `Ok(None)` when the id is unknown.
    async fn get_user(&self, id: &UserRecordId) -> Result<Option<UserRecord>, Error>;
}
