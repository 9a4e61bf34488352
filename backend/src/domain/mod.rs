//! Domain types and use cases.
//!
//! Purpose: hold the intake and registration rules independent of HTTP and
//! of the hosted identity service. Adapters reach the domain through the
//! traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - NewPatientUser / UserRecord: validated intake data and the remote record.
//! - PatientAccountService: create-or-fetch-by-email use case.
//! - IntakeForm: intake submission with per-email in-flight guard.
//! - RegistrationService: follow-up registration validation.

pub mod catalogue;
pub mod error;
pub mod field_errors;
pub mod intake_form;
pub mod patient;
pub mod patient_accounts;
pub mod ports;
pub mod registration;
pub mod trace_id;

pub use self::catalogue::{Gender, IntakeOptions, Physician};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::field_errors::{FieldError, FieldErrors, FieldFailure};
pub use self::intake_form::{IntakeForm, SubmitOutcome};
pub use self::patient::{
    CountryCode, EmailAddress, NewPatientUser, PatientName, PatientValidationError, PhoneNumber,
    UserDataInput, UserRecord, UserRecordId,
};
pub use self::patient_accounts::PatientAccountService;
pub use self::registration::{
    IdentificationDocument, PatientRegistration, RegistrationInput, RegistrationService,
    RegistrationValidationError,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use patient_intake::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("no such patient"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
