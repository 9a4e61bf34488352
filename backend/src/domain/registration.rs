//! Follow-up patient registration.
//!
//! After the intake form yields a user record, the client continues to the
//! registration page for that id. The form is grouped into personal details,
//! medical details, identification and consent. Validation reports every
//! failing field; the normalised result is returned to the caller and is not
//! persisted here.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::catalogue::{Gender, find_identification_type, find_physician};
use super::field_errors::{FieldErrors, FieldFailure};
use super::ports::PatientAccounts;
use super::{CountryCode, EmailAddress, Error, PatientName, PhoneNumber, UserRecordId};

/// Minimum length of address and occupation, in characters.
pub const LONG_TEXT_MIN: usize = 2;
/// Maximum length of address and occupation, in characters.
pub const LONG_TEXT_MAX: usize = 500;
/// Minimum length of contact and insurance fields.
pub const SHORT_TEXT_MIN: usize = 2;
/// Maximum length of contact and insurance fields.
pub const SHORT_TEXT_MAX: usize = 50;
/// Maximum length of each optional medical note.
pub const MEDICAL_NOTE_MAX: usize = 1000;
/// Maximum length of an identification number.
pub const IDENTIFICATION_NUMBER_MAX: usize = 50;
/// Largest identification document accepted, in bytes.
pub const DOCUMENT_MAX_BYTES: u64 = 10 * 1024 * 1024;
/// Document media types accepted for identification uploads.
pub const DOCUMENT_CONTENT_TYPES: [&str; 4] =
    ["image/png", "image/jpeg", "image/svg+xml", "application/pdf"];

/// Earliest accepted birth date.
fn earliest_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Validation errors specific to the registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    Empty,
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidDate,
    FutureDate,
    DateTooEarly,
    UnknownGender,
    UnknownPhysician,
    UnknownIdentificationType,
    DocumentTooLarge { max: u64 },
    UnsupportedDocumentType,
    ConsentRequired,
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "value must not be empty"),
            Self::TooShort { min } => write!(f, "value must be at least {min} characters"),
            Self::TooLong { max } => write!(f, "value must be at most {max} characters"),
            Self::InvalidDate => write!(f, "date must use the YYYY-MM-DD format"),
            Self::FutureDate => write!(f, "date must not be in the future"),
            Self::DateTooEarly => write!(f, "date must not be before 1900-01-01"),
            Self::UnknownGender => write!(f, "gender must be one of Male, Female or Other"),
            Self::UnknownPhysician => write!(f, "physician must be selected from the list"),
            Self::UnknownIdentificationType => {
                write!(f, "identification type must be selected from the list")
            }
            Self::DocumentTooLarge { max } => {
                write!(f, "document must be at most {max} bytes")
            }
            Self::UnsupportedDocumentType => {
                write!(f, "document must be a PNG, JPEG, SVG or PDF file")
            }
            Self::ConsentRequired => write!(f, "consent is required to proceed"),
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

impl FieldFailure for RegistrationValidationError {
    fn code(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooShort { .. } => "too_short",
            Self::TooLong { .. } | Self::DocumentTooLarge { .. } => "too_long",
            Self::InvalidDate => "invalid_date",
            Self::FutureDate => "future_date",
            Self::DateTooEarly => "date_too_early",
            Self::UnknownGender
            | Self::UnknownPhysician
            | Self::UnknownIdentificationType => "unknown_option",
            Self::UnsupportedDocumentType => "unsupported_type",
            Self::ConsentRequired => "consent_required",
        }
    }
}

fn bounded_text(
    value: &str,
    min: usize,
    max: usize,
) -> Result<String, RegistrationValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistrationValidationError::Empty);
    }
    let length = trimmed.chars().count();
    if length < min {
        return Err(RegistrationValidationError::TooShort { min });
    }
    if length > max {
        return Err(RegistrationValidationError::TooLong { max });
    }
    Ok(trimmed.to_owned())
}

/// Blank optional text becomes `None`.
fn optional_text(
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, RegistrationValidationError> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > max {
        return Err(RegistrationValidationError::TooLong { max });
    }
    Ok(Some(trimmed.to_owned()))
}

fn birth_date(value: &str, today: NaiveDate) -> Result<NaiveDate, RegistrationValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RegistrationValidationError::Empty);
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| RegistrationValidationError::InvalidDate)?;
    if date > today {
        return Err(RegistrationValidationError::FutureDate);
    }
    if date < earliest_birth_date() {
        return Err(RegistrationValidationError::DateTooEarly);
    }
    Ok(date)
}

fn consent(given: bool) -> Result<bool, RegistrationValidationError> {
    if given {
        Ok(true)
    } else {
        Err(RegistrationValidationError::ConsentRequired)
    }
}

/// Metadata for an uploaded identification document.
///
/// The bytes themselves go to file storage; only the descriptor travels with
/// the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationDocument {
    /// Original file name.
    pub file_name: String,
    /// Declared media type.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
}

impl IdentificationDocument {
    fn validate(&self) -> Result<Self, RegistrationValidationError> {
        let file_name = self.file_name.trim();
        if file_name.is_empty() {
            return Err(RegistrationValidationError::Empty);
        }
        let content_type = self.content_type.trim().to_ascii_lowercase();
        if !DOCUMENT_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(RegistrationValidationError::UnsupportedDocumentType);
        }
        if self.size_bytes > DOCUMENT_MAX_BYTES {
            return Err(RegistrationValidationError::DocumentTooLarge {
                max: DOCUMENT_MAX_BYTES,
            });
        }
        Ok(Self {
            file_name: file_name.to_owned(),
            content_type,
            size_bytes: self.size_bytes,
        })
    }
}

/// Registration form exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// ISO `YYYY-MM-DD`.
    pub birth_date: String,
    pub gender: String,
    pub address: String,
    pub occupation: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub primary_physician: String,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    pub allergies: Option<String>,
    pub current_medication: Option<String>,
    pub family_medical_history: Option<String>,
    pub past_medical_history: Option<String>,
    pub identification_type: Option<String>,
    pub identification_number: Option<String>,
    pub identification_document: Option<IdentificationDocument>,
    pub treatment_consent: bool,
    pub disclosure_consent: bool,
    pub privacy_consent: bool,
}

/// Personal details section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub name: PatientName,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub address: String,
    pub occupation: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: PhoneNumber,
}

/// Medical details section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalDetails {
    pub primary_physician: String,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    pub allergies: Option<String>,
    pub current_medication: Option<String>,
    pub family_medical_history: Option<String>,
    pub past_medical_history: Option<String>,
}

/// Identification section; every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
    pub kind: Option<String>,
    pub number: Option<String>,
    pub document: Option<IdentificationDocument>,
}

/// Consents recorded at registration. Every flag is `true` once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Consents {
    pub treatment: bool,
    pub disclosure: bool,
    pub privacy: bool,
}

/// A validated registration for an existing user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRegistration {
    pub user_id: UserRecordId,
    pub personal: PersonalDetails,
    pub medical: MedicalDetails,
    pub identification: Identification,
    pub consents: Consents,
}

impl PatientRegistration {
    /// Validate `input` for `user_id`, treating `today` as the latest
    /// acceptable birth date.
    pub fn validate(
        user_id: UserRecordId,
        input: &RegistrationInput,
        today: NaiveDate,
    ) -> Result<Self, FieldErrors> {
        Self::validate_with_country(user_id, input, today, &CountryCode::default())
    }

    /// As [`PatientRegistration::validate`], normalising national phone
    /// numbers with `country`.
    pub fn validate_with_country(
        user_id: UserRecordId,
        input: &RegistrationInput,
        today: NaiveDate,
        country: &CountryCode,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = errors.check("name", PatientName::new(&input.name));
        let email = errors.check("email", EmailAddress::new(&input.email));
        let phone = errors.check("phone", PhoneNumber::with_country(&input.phone, country));
        let birth = errors.check("birthDate", birth_date(&input.birth_date, today));
        let gender = errors.check(
            "gender",
            Gender::parse(&input.gender).ok_or(RegistrationValidationError::UnknownGender),
        );
        let address = errors.check(
            "address",
            bounded_text(&input.address, LONG_TEXT_MIN, LONG_TEXT_MAX),
        );
        let occupation = errors.check(
            "occupation",
            bounded_text(&input.occupation, LONG_TEXT_MIN, LONG_TEXT_MAX),
        );
        let contact_name = errors.check(
            "emergencyContactName",
            bounded_text(&input.emergency_contact_name, SHORT_TEXT_MIN, SHORT_TEXT_MAX),
        );
        let contact_number = errors.check(
            "emergencyContactNumber",
            PhoneNumber::with_country(&input.emergency_contact_number, country),
        );

        let physician = errors.check(
            "primaryPhysician",
            find_physician(&input.primary_physician)
                .map(|physician| physician.name.to_owned())
                .ok_or(RegistrationValidationError::UnknownPhysician),
        );
        let insurer = errors.check(
            "insuranceProvider",
            bounded_text(&input.insurance_provider, SHORT_TEXT_MIN, SHORT_TEXT_MAX),
        );
        let policy = errors.check(
            "insurancePolicyNumber",
            bounded_text(&input.insurance_policy_number, SHORT_TEXT_MIN, SHORT_TEXT_MAX),
        );
        let allergies = errors.check(
            "allergies",
            optional_text(input.allergies.as_deref(), MEDICAL_NOTE_MAX),
        );
        let medication = errors.check(
            "currentMedication",
            optional_text(input.current_medication.as_deref(), MEDICAL_NOTE_MAX),
        );
        let family_history = errors.check(
            "familyMedicalHistory",
            optional_text(input.family_medical_history.as_deref(), MEDICAL_NOTE_MAX),
        );
        let past_history = errors.check(
            "pastMedicalHistory",
            optional_text(input.past_medical_history.as_deref(), MEDICAL_NOTE_MAX),
        );

        let id_kind = errors.check(
            "identificationType",
            match input.identification_type.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(kind) => find_identification_type(kind)
                    .map(|kind| Some(kind.to_owned()))
                    .ok_or(RegistrationValidationError::UnknownIdentificationType),
            },
        );
        let id_number = errors.check(
            "identificationNumber",
            optional_text(
                input.identification_number.as_deref(),
                IDENTIFICATION_NUMBER_MAX,
            ),
        );
        let id_document = errors.check(
            "identificationDocument",
            input
                .identification_document
                .as_ref()
                .map(IdentificationDocument::validate)
                .transpose(),
        );

        let treatment = errors.check("treatmentConsent", consent(input.treatment_consent));
        let disclosure = errors.check("disclosureConsent", consent(input.disclosure_consent));
        let privacy = errors.check("privacyConsent", consent(input.privacy_consent));

        let (
            Some(name),
            Some(email),
            Some(phone),
            Some(birth_date),
            Some(gender),
            Some(address),
            Some(occupation),
            Some(emergency_contact_name),
            Some(emergency_contact_number),
        ) = (
            name,
            email,
            phone,
            birth,
            gender,
            address,
            occupation,
            contact_name,
            contact_number,
        )
        else {
            return Err(errors);
        };
        let (
            Some(primary_physician),
            Some(insurance_provider),
            Some(insurance_policy_number),
            Some(allergies),
            Some(current_medication),
            Some(family_medical_history),
            Some(past_medical_history),
        ) = (
            physician,
            insurer,
            policy,
            allergies,
            medication,
            family_history,
            past_history,
        )
        else {
            return Err(errors);
        };
        let (Some(kind), Some(number), Some(document)) = (id_kind, id_number, id_document) else {
            return Err(errors);
        };
        let (Some(treatment), Some(disclosure), Some(privacy)) = (treatment, disclosure, privacy)
        else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            user_id,
            personal: PersonalDetails {
                name,
                email,
                phone,
                birth_date,
                gender,
                address,
                occupation,
                emergency_contact_name,
                emergency_contact_number,
            },
            medical: MedicalDetails {
                primary_physician,
                insurance_provider,
                insurance_policy_number,
                allergies,
                current_medication,
                family_medical_history,
                past_medical_history,
            },
            identification: Identification {
                kind,
                number,
                document,
            },
            consents: Consents {
                treatment,
                disclosure,
                privacy,
            },
        })
    }
}

/// Registration use case: validate the form and confirm the user exists.
#[derive(Clone)]
pub struct RegistrationService {
    accounts: Arc<dyn PatientAccounts>,
    country: CountryCode,
}

impl RegistrationService {
    /// Build over the accounts use case.
    pub fn new(accounts: Arc<dyn PatientAccounts>) -> Self {
        Self {
            accounts,
            country: CountryCode::default(),
        }
    }

    /// Use `country` for phone numbers entered without a calling code.
    #[must_use]
    pub fn with_country(mut self, country: CountryCode) -> Self {
        self.country = country;
        self
    }

    /// Validate `input` and check that `user_id` names an existing user.
    ///
    /// Validation runs first so malformed forms never reach the identity
    /// service.
    pub async fn register(
        &self,
        user_id: UserRecordId,
        input: &RegistrationInput,
        today: NaiveDate,
    ) -> Result<PatientRegistration, Error> {
        let registration =
            PatientRegistration::validate_with_country(user_id, input, today, &self.country)
                .map_err(FieldErrors::into_error)?;
        match self.accounts.get_user(&registration.user_id).await? {
            Some(_) => {
                info!(user_id = %registration.user_id, "patient registration accepted");
                Ok(registration)
            }
            None => Err(Error::not_found(format!(
                "user {} not found",
                registration.user_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests;
