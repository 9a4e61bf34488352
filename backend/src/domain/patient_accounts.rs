//! Create-or-fetch patient user accounts.
//!
//! Creation is idempotent on email: a conflict from the identity service
//! triggers exactly one lookup by email and the first match is returned.
//! There is no retry and no handling of races between the conflict and the
//! lookup; a record deleted in between simply yields
//! [`CreateUserFailure::ConflictUnresolved`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::ports::{
    CreateUserFailure, CreateUserOutcome, IdentityDirectory, IdentityDirectoryError,
    PatientAccounts, remote_error,
};
use crate::domain::{Error, NewPatientUser, UserRecord, UserRecordId};

/// Patient accounts service backed by an identity directory.
pub struct PatientAccountService<D: ?Sized> {
    directory: Arc<D>,
}

impl<D: ?Sized> Clone for PatientAccountService<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<D: ?Sized> PatientAccountService<D> {
    /// Create a service over the given directory client.
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }
}

impl<D> PatientAccountService<D>
where
    D: IdentityDirectory + ?Sized,
{
    async fn recover_existing(&self, user: &NewPatientUser) -> CreateUserOutcome {
        match self.directory.find_by_email(user.email()).await {
            Ok(records) => match records.into_iter().next() {
                Some(record) => {
                    info!(user_id = %record.id, "returning existing user for email");
                    CreateUserOutcome::AlreadyExists(record)
                }
                None => {
                    warn!(
                        email = %user.email(),
                        "create conflicted but no user matched the email"
                    );
                    CreateUserOutcome::Failed(CreateUserFailure::ConflictUnresolved {
                        email: user.email().clone(),
                    })
                }
            },
            Err(err) => {
                error!(error = %err, "lookup after create conflict failed");
                CreateUserOutcome::Failed(CreateUserFailure::Lookup(err))
            }
        }
    }
}

#[async_trait]
impl<D> PatientAccounts for PatientAccountService<D>
where
    D: IdentityDirectory + ?Sized,
{
    async fn create_user(&self, user: &NewPatientUser) -> CreateUserOutcome {
        let id = UserRecordId::generate();
        match self.directory.create(&id, user).await {
            Ok(record) => {
                info!(user_id = %record.id, "created patient user");
                CreateUserOutcome::Created(record)
            }
            Err(err) if err.is_conflict() => self.recover_existing(user).await,
            Err(err) => {
                error!(error = %err, "an error occurred while creating a new user");
                CreateUserOutcome::Failed(CreateUserFailure::Remote(err))
            }
        }
    }

    async fn get_user(&self, id: &UserRecordId) -> Result<Option<UserRecord>, Error> {
        match self.directory.get(id).await {
            Ok(record) => Ok(Some(record)),
            Err(IdentityDirectoryError::NotFound { .. }) => Ok(None),
            Err(err) => {
                error!(user_id = %id, error = %err, "fetching user failed");
                Err(remote_error(&err))
            }
        }
    }
}

#[cfg(test)]
#[path = "patient_accounts_tests.rs"]
mod tests;
