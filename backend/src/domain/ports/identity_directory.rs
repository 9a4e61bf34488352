//! Driven port for the hosted identity (user management) service.
//!
//! The service owns user storage, email uniqueness and record identity. The
//! domain only needs three primitives: create with a caller-chosen id, list
//! by exact email, and fetch by id.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{EmailAddress, NewPatientUser, UserRecord, UserRecordId};

define_port_error! {
    /// Failures reported by identity directory adapters.
    pub enum IdentityDirectoryError {
        /// A user with the same email (or id) already exists.
        Conflict { message: String } => "identity record conflict: {message}",
        /// No user exists for the requested id.
        NotFound { message: String } => "identity record not found: {message}",
        /// Credentials were rejected by the identity service.
        Unauthorized { message: String } => "identity service rejected credentials: {message}",
        /// The identity service refused the request as malformed.
        InvalidRequest { message: String } => "identity request invalid: {message}",
        /// The identity service throttled the request.
        RateLimited { message: String } => "identity service rate limited request: {message}",
        /// The call exceeded its deadline.
        Timeout { message: String } => "identity service timeout: {message}",
        /// Network or server failure before a usable response arrived.
        Transport { message: String } => "identity service transport failed: {message}",
        /// The response could not be decoded.
        Decode { message: String } => "identity response decode failed: {message}",
    }
}

impl IdentityDirectoryError {
    /// Whether this is the one failure `create_user` recovers from.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Whether the failure reflects an unavailable dependency rather than a
    /// rejected request.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

/// Port for the identity service's user API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Create a user record under `id`.
    ///
    /// Returns [`IdentityDirectoryError::Conflict`] when the email is taken.
    async fn create(
        &self,
        id: &UserRecordId,
        user: &NewPatientUser,
    ) -> Result<UserRecord, IdentityDirectoryError>;

    /// List users whose email equals `email` exactly.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Vec<UserRecord>, IdentityDirectoryError>;

    /// Fetch one user by id.
    async fn get(&self, id: &UserRecordId) -> Result<UserRecord, IdentityDirectoryError>;
}

/// In-memory directory enforcing email uniqueness.
///
/// Stands in for the hosted service in local runs and integration tests.
///
/// # Examples
/// ```
/// use patient_intake::domain::ports::{FixtureIdentityDirectory, IdentityDirectory};
/// use patient_intake::domain::{NewPatientUser, UserDataInput, UserRecordId};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let directory = FixtureIdentityDirectory::default();
/// let user = NewPatientUser::validate(&UserDataInput {
///     name: "John Doe".into(),
///     email: "john@example.com".into(),
///     phone: "3131234567".into(),
/// })
/// .expect("valid");
/// let id = UserRecordId::new("abc123").expect("valid id");
/// let record = directory.create(&id, &user).await.expect("created");
/// assert_eq!(record.id, id);
/// assert!(directory.create(&UserRecordId::generate(), &user).await.is_err());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct FixtureIdentityDirectory {
    records: Mutex<BTreeMap<String, UserRecord>>,
}

impl FixtureIdentityDirectory {
    fn with_records<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, UserRecord>) -> Result<T, IdentityDirectoryError>,
    ) -> Result<T, IdentityDirectoryError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| IdentityDirectoryError::transport("fixture directory lock poisoned"))?;
        f(&mut records)
    }
}

#[async_trait]
impl IdentityDirectory for FixtureIdentityDirectory {
    async fn create(
        &self,
        id: &UserRecordId,
        user: &NewPatientUser,
    ) -> Result<UserRecord, IdentityDirectoryError> {
        self.with_records(|records| {
            if records.contains_key(id.as_ref()) {
                return Err(IdentityDirectoryError::conflict(format!("id {id} exists")));
            }
            if records
                .values()
                .any(|record| record.email == user.email().as_ref())
            {
                return Err(IdentityDirectoryError::conflict(format!(
                    "email {} exists",
                    user.email()
                )));
            }
            let record = UserRecord {
                id: id.clone(),
                name: user.name().to_string(),
                email: user.email().to_string(),
                phone: user.phone().to_string(),
            };
            records.insert(id.to_string(), record.clone());
            Ok(record)
        })
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Vec<UserRecord>, IdentityDirectoryError> {
        self.with_records(|records| {
            Ok(records
                .values()
                .filter(|record| record.email == email.as_ref())
                .cloned()
                .collect())
        })
    }

    async fn get(&self, id: &UserRecordId) -> Result<UserRecord, IdentityDirectoryError> {
        self.with_records(|records| {
            records
                .get(id.as_ref())
                .cloned()
                .ok_or_else(|| IdentityDirectoryError::not_found(id.to_string()))
        })
    }
}
