//! Patient user data and the remote user record.
//!
//! [`NewPatientUser`] is the validated form of the three intake fields (name,
//! email, phone). It is built fresh for each submission and never stored
//! locally; the identity service owns the resulting [`UserRecord`].

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field_errors::{FieldErrors, FieldFailure};

/// Minimum length of a patient name, in characters.
pub const NAME_MIN: usize = 2;
/// Maximum length of a patient name, in characters.
pub const NAME_MAX: usize = 50;
/// Digits in a national number without its calling code.
const NATIONAL_DIGITS: usize = 10;
/// Maximum length of an email address.
pub const EMAIL_MAX: usize = 254;
/// Maximum length of a remote user identifier.
pub const USER_RECORD_ID_MAX: usize = 36;
/// Calling code prefixed to ten-digit numbers entered without a leading `+`.
pub const DEFAULT_COUNTRY_CODE: &str = "1";

/// Validation errors for the intake fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientValidationError {
    EmptyName,
    NameTooShort { min: usize },
    NameTooLong { max: usize },
    EmptyEmail,
    EmailTooLong { max: usize },
    InvalidEmail,
    EmptyPhone,
    InvalidPhone,
    InvalidCountryCode,
    EmptyUserRecordId,
    InvalidUserRecordId,
}

impl fmt::Display for PatientValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooShort { min } => write!(f, "name must be at least {min} characters"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPhone => write!(f, "phone must not be empty"),
            Self::InvalidPhone => write!(
                f,
                "phone must contain 10 to 15 digits with an optional leading +"
            ),
            Self::InvalidCountryCode => write!(
                f,
                "country code must be one to three digits not starting with 0"
            ),
            Self::EmptyUserRecordId => write!(f, "user id must not be empty"),
            Self::InvalidUserRecordId => write!(
                f,
                "user id must be at most 36 letters, digits, '.', '-' or '_' and start with a letter or digit"
            ),
        }
    }
}

impl std::error::Error for PatientValidationError {}

impl FieldFailure for PatientValidationError {
    fn code(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::EmptyEmail | Self::EmptyPhone | Self::EmptyUserRecordId => {
                "empty"
            }
            Self::NameTooShort { .. } => "too_short",
            Self::NameTooLong { .. } | Self::EmailTooLong { .. } => "too_long",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidPhone => "invalid_phone",
            Self::InvalidCountryCode => "invalid_country_code",
            Self::InvalidUserRecordId => "invalid_user_id",
        }
    }
}

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("regex {pattern} failed to compile: {error}"))
    })
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();
static RECORD_ID_RE: OnceLock<Regex> = OnceLock::new();

/// Patient full name, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatientName(String);

impl PatientName {
    /// Validate and construct a name.
    pub fn new(name: impl AsRef<str>) -> Result<Self, PatientValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PatientValidationError::EmptyName);
        }
        let length = trimmed.chars().count();
        if length < NAME_MIN {
            return Err(PatientValidationError::NameTooShort { min: NAME_MIN });
        }
        if length > NAME_MAX {
            return Err(PatientValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

/// Email address, trimmed and lowercased.
///
/// Lookups after a conflict match on this exact value, so the normalised form
/// is what gets sent to the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an email address.
    ///
    /// # Examples
    /// ```
    /// use patient_intake::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new(" John@Example.com ").expect("valid");
    /// assert_eq!(email.as_ref(), "john@example.com");
    /// ```
    pub fn new(email: impl AsRef<str>) -> Result<Self, PatientValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PatientValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(PatientValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !compiled(&EMAIL_RE, r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").is_match(trimmed) {
            return Err(PatientValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

/// International calling code used for numbers entered without a `+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCode(String);

impl CountryCode {
    /// Validate a calling code such as `1` or `+44`.
    pub fn new(code: impl AsRef<str>) -> Result<Self, PatientValidationError> {
        let digits = code.as_ref().trim();
        let digits = digits.strip_prefix('+').unwrap_or(digits);
        let valid = (1..=3).contains(&digits.len())
            && digits.bytes().all(|b| b.is_ascii_digit())
            && !digits.starts_with('0');
        if !valid {
            return Err(PatientValidationError::InvalidCountryCode);
        }
        Ok(Self(digits.to_owned()))
    }
}

impl Default for CountryCode {
    fn default() -> Self {
        Self(DEFAULT_COUNTRY_CODE.to_owned())
    }
}

/// Phone number in E.164 form (`+` followed by digits).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate a phone number, treating ten-digit national numbers as
    /// belonging to [`DEFAULT_COUNTRY_CODE`].
    ///
    /// # Examples
    /// ```
    /// use patient_intake::domain::PhoneNumber;
    ///
    /// let phone = PhoneNumber::new("(313) 123-4567").expect("valid");
    /// assert_eq!(phone.as_ref(), "+13131234567");
    /// ```
    pub fn new(phone: impl AsRef<str>) -> Result<Self, PatientValidationError> {
        Self::with_country(phone, &CountryCode::default())
    }

    /// Validate a phone number and normalise it to E.164.
    ///
    /// Spaces, dashes, dots and parentheses are dropped before checking for
    /// 10 to 15 digits with an optional leading `+`. Without a `+`, exactly
    /// ten digits are a national number and get `country` prefixed; longer
    /// numbers are taken to already start with their calling code.
    pub fn with_country(
        phone: impl AsRef<str>,
        country: &CountryCode,
    ) -> Result<Self, PatientValidationError> {
        let compact: String = phone
            .as_ref()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        if compact.is_empty() {
            return Err(PatientValidationError::EmptyPhone);
        }
        if !compiled(&PHONE_RE, r"^\+?[0-9]{10,15}$").is_match(&compact) {
            return Err(PatientValidationError::InvalidPhone);
        }
        let e164 = if compact.starts_with('+') {
            compact
        } else if compact.len() == NATIONAL_DIGITS {
            format!("+{}{compact}", country.as_ref())
        } else {
            format!("+{compact}")
        };
        Ok(Self(e164))
    }
}

/// Identifier of a user record in the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserRecordId(String);

impl UserRecordId {
    /// Validate and construct an identifier received from a client or the
    /// remote service.
    pub fn new(id: impl AsRef<str>) -> Result<Self, PatientValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(PatientValidationError::EmptyUserRecordId);
        }
        // One leading alphanumeric plus up to 35 more characters.
        if !compiled(&RECORD_ID_RE, r"^[A-Za-z0-9][A-Za-z0-9._-]{0,35}$").is_match(id) {
            return Err(PatientValidationError::InvalidUserRecordId);
        }
        Ok(Self(id.to_owned()))
    }

    /// Generate a fresh identifier (UUID v4 without hyphens).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

macro_rules! string_newtype {
    ($($name:ident),* $(,)?) => {
        $(
            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_ref())
                }
            }

            impl From<$name> for String {
                fn from(value: $name) -> Self {
                    value.0
                }
            }

            impl TryFrom<String> for $name {
                type Error = PatientValidationError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::new(value)
                }
            }
        )*
    };
}

string_newtype!(CountryCode, PatientName, EmailAddress, PhoneNumber, UserRecordId);

/// Unvalidated intake fields as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDataInput {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number, any common formatting.
    pub phone: String,
}

/// Validated user data forwarded to the identity service.
///
/// ## Invariants
/// - every field satisfies its newtype's rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatientUser {
    name: PatientName,
    email: EmailAddress,
    phone: PhoneNumber,
}

impl NewPatientUser {
    /// Build from validated parts.
    pub fn new(name: PatientName, email: EmailAddress, phone: PhoneNumber) -> Self {
        Self { name, email, phone }
    }

    /// Validate all three fields, collecting every failure.
    ///
    /// # Examples
    /// ```
    /// use patient_intake::domain::{NewPatientUser, UserDataInput};
    ///
    /// let input = UserDataInput {
    ///     name: "John Doe".into(),
    ///     email: "john@example.com".into(),
    ///     phone: "3131234567".into(),
    /// };
    /// let user = NewPatientUser::validate(&input).expect("valid");
    /// assert_eq!(user.email().as_ref(), "john@example.com");
    /// ```
    pub fn validate(input: &UserDataInput) -> Result<Self, FieldErrors> {
        Self::validate_with_country(input, &CountryCode::default())
    }

    /// Validate all three fields, normalising national phone numbers with
    /// `country`.
    pub fn validate_with_country(
        input: &UserDataInput,
        country: &CountryCode,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.check("name", PatientName::new(&input.name));
        let email = errors.check("email", EmailAddress::new(&input.email));
        let phone = errors.check("phone", PhoneNumber::with_country(&input.phone, country));
        match (name, email, phone) {
            (Some(name), Some(email), Some(phone)) if errors.is_empty() => {
                Ok(Self::new(name, email, phone))
            }
            _ => Err(errors),
        }
    }

    /// Full name.
    pub fn name(&self) -> &PatientName {
        &self.name
    }

    /// Email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Phone number.
    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }
}

/// User record as stored by the identity service.
///
/// Only `id` is relied upon; the other fields are echoed as the remote
/// service returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Remote identifier.
    pub id: UserRecordId,
    /// Name held by the remote service.
    pub name: String,
    /// Email held by the remote service.
    pub email: String,
    /// Phone held by the remote service; empty when unset.
    pub phone: String,
}

impl UserRecord {
    /// Client-side location of the follow-up registration page.
    ///
    /// # Examples
    /// ```
    /// use patient_intake::domain::{UserRecord, UserRecordId};
    ///
    /// let record = UserRecord {
    ///     id: UserRecordId::new("abc123").expect("valid id"),
    ///     name: "John Doe".into(),
    ///     email: "john@example.com".into(),
    ///     phone: "3131234567".into(),
    /// };
    /// assert_eq!(record.registration_path(), "/patients/abc123/register");
    /// ```
    pub fn registration_path(&self) -> String {
        format!("/patients/{}/register", self.id)
    }
}
