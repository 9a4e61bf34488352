//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the patient intake and health endpoints together with
//! the schema wrappers from `inbound::http::schemas`, so domain types stay
//! free of utoipa derives. The document backs Swagger UI in debug builds and
//! is exported by `cargo run --bin openapi-dump`.

use crate::inbound::http::patients::{CreatePatientResponse, PatientUserResponse};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, IdentificationDocumentSchema, IntakeOptionsSchema,
    PatientRegistrationSchema, PhysicianSchema, RegistrationInputSchema, UserDataInputSchema,
};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Patient intake API",
        description = "Intake submission, follow-up registration and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::patients::create_patient,
        crate::inbound::http::patients::get_patient,
        crate::inbound::http::patients::register_patient,
        crate::inbound::http::patients::intake_options,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CreatePatientResponse,
        PatientUserResponse,
        UserDataInputSchema,
        RegistrationInputSchema,
        IdentificationDocumentSchema,
        PatientRegistrationSchema,
        PhysicianSchema,
        IntakeOptionsSchema,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "patients", description = "Patient intake and registration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const REGISTRATION_INPUT_SCHEMA_NAME: &str = "crate.domain.RegistrationInput";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn openapi_registration_schema_has_consents() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get(REGISTRATION_INPUT_SCHEMA_NAME)
            .expect("RegistrationInput schema");

        assert_object_schema_has_field(schema, "treatmentConsent");
        assert_object_schema_has_field(schema, "birthDate");
    }

    #[test]
    fn openapi_lists_every_patient_path() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/patients",
            "/api/v1/patients/{userId}",
            "/api/v1/patients/{userId}/register",
            "/api/v1/intake/options",
            "/health/ready",
            "/health/live",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
