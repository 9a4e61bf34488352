//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their serialised shape and register under the domain
//! type's path via `#[schema(as = ...)]`.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request clashes with a submission already in progress.
    #[schema(rename = "conflict")]
    Conflict,
    /// The identity service is unavailable or timed out.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "email must be a valid address")]
    message: String,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "6f1c2d8e-4b4a-4d1e-9d59-1d7f0c1b2a3e")]
    trace_id: Option<String>,
    /// Field failures as `{"fields": [{"field", "code", "message"}]}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::UserDataInput`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UserDataInput)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserDataInputSchema {
    #[schema(example = "John Doe")]
    name: String,
    #[schema(example = "john@example.com")]
    email: String,
    /// Any common formatting; 10 to 15 digits with an optional leading `+`.
    /// Ten-digit national numbers get the default calling code.
    #[schema(example = "+1 (313) 123-4567")]
    phone: String,
}

/// OpenAPI schema for [`crate::domain::IdentificationDocument`].
#[derive(ToSchema)]
#[schema(as = crate::domain::IdentificationDocument)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct IdentificationDocumentSchema {
    #[schema(example = "passport.png")]
    file_name: String,
    #[schema(example = "image/png")]
    content_type: String,
    size_bytes: u64,
}

/// OpenAPI schema for [`crate::domain::RegistrationInput`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RegistrationInput)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RegistrationInputSchema {
    name: String,
    email: String,
    phone: String,
    #[schema(example = "1985-04-12")]
    birth_date: String,
    #[schema(example = "Male")]
    gender: String,
    address: String,
    occupation: String,
    emergency_contact_name: String,
    emergency_contact_number: String,
    #[schema(example = "Leila Cameron")]
    primary_physician: String,
    insurance_provider: String,
    insurance_policy_number: String,
    allergies: Option<String>,
    current_medication: Option<String>,
    family_medical_history: Option<String>,
    past_medical_history: Option<String>,
    #[schema(example = "Passport")]
    identification_type: Option<String>,
    identification_number: Option<String>,
    identification_document: Option<IdentificationDocumentSchema>,
    treatment_consent: bool,
    disclosure_consent: bool,
    privacy_consent: bool,
}

/// OpenAPI schema for [`crate::domain::PatientRegistration`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PatientRegistration)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PatientRegistrationSchema {
    #[schema(example = "abc123")]
    user_id: String,
    /// Normalised personal details.
    personal: serde_json::Value,
    /// Normalised medical details.
    medical: serde_json::Value,
    /// Identification type, number and document descriptor.
    identification: serde_json::Value,
    /// Treatment, disclosure and privacy consents.
    consents: serde_json::Value,
}

/// OpenAPI schema for [`crate::domain::Physician`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Physician)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PhysicianSchema {
    #[schema(example = "Leila Cameron")]
    name: String,
    #[schema(example = "/assets/images/dr-cameron.png")]
    image: String,
}

/// OpenAPI schema for [`crate::domain::IntakeOptions`].
#[derive(ToSchema)]
#[schema(as = crate::domain::IntakeOptions)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct IntakeOptionsSchema {
    genders: Vec<String>,
    physicians: Vec<PhysicianSchema>,
    identification_types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_variants_match_domain() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
        for code in [
            "invalid_request",
            "not_found",
            "conflict",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn error_schema_uses_camel_case_fields() {
        let schema_json = schema_to_json::<ErrorSchema>();
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("traceId"));
    }

    #[test]
    fn registration_schema_lists_consents() {
        let schema_json = schema_to_json::<RegistrationInputSchema>();
        assert!(schema_json.contains("privacyConsent"));
        assert!(schema_json.contains("identificationDocument"));
    }
}
