//! Patient intake HTTP handlers.
//!
//! ```text
//! POST /api/v1/patients {"name":"John Doe","email":"john@example.com","phone":"3131234567"}
//! GET /api/v1/patients/{userId}
//! POST /api/v1/patients/{userId}/register
//! GET /api/v1/intake/options
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Error, FieldErrors, IntakeOptions, PatientRegistration, RegistrationInput, SubmitOutcome,
    UserDataInput, UserRecord, UserRecordId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    ErrorSchema, IntakeOptionsSchema, PatientRegistrationSchema, RegistrationInputSchema,
    UserDataInputSchema,
};
use crate::inbound::http::state::HttpState;

/// Path parameters for routes keyed by user id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPath {
    pub user_id: String,
}

/// User record as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientUserResponse {
    #[schema(example = "abc123")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<UserRecord> for PatientUserResponse {
    fn from(value: UserRecord) -> Self {
        Self {
            id: value.id.into(),
            name: value.name,
            email: value.email,
            phone: value.phone,
        }
    }
}

/// Response to a successful intake submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientResponse {
    #[schema(example = "abc123")]
    pub user_id: String,
    /// `created` or `existing`.
    #[schema(example = "created")]
    pub outcome: String,
    /// Client path of the registration page.
    #[schema(example = "/patients/abc123/register")]
    pub redirect_to: String,
    pub user: PatientUserResponse,
}

fn parse_user_id(path: PatientPath) -> Result<UserRecordId, Error> {
    let mut errors = FieldErrors::new();
    errors
        .check("userId", UserRecordId::new(&path.user_id))
        .ok_or_else(|| errors.into_error())
}

fn in_flight_error() -> Error {
    Error::conflict("a submission for this email is already in progress")
        .with_details(json!({ "code": "submission_in_flight" }))
}

/// Submit the intake form, creating the user or returning the existing one.
#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = UserDataInputSchema,
    responses(
        (
            status = 201,
            description = "User created",
            headers(("Location" = String, description = "Registration page path")),
            body = CreatePatientResponse
        ),
        (status = 200, description = "User already existed", body = CreatePatientResponse),
        (status = 400, description = "Invalid intake fields", body = ErrorSchema),
        (status = 409, description = "Submission already in progress", body = ErrorSchema),
        (status = 503, description = "Identity service unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "createPatient"
)]
#[post("/patients")]
pub async fn create_patient(
    state: web::Data<HttpState>,
    payload: web::Json<UserDataInput>,
) -> ApiResult<HttpResponse> {
    match state.intake.submit(&payload).await {
        SubmitOutcome::Navigate {
            record,
            existing,
            location,
        } => {
            let response = CreatePatientResponse {
                user_id: record.id.to_string(),
                outcome: if existing { "existing" } else { "created" }.to_owned(),
                redirect_to: location.clone(),
                user: PatientUserResponse::from(record),
            };
            if existing {
                Ok(HttpResponse::Ok().json(response))
            } else {
                Ok(HttpResponse::Created()
                    .insert_header((header::LOCATION, location))
                    .json(response))
            }
        }
        SubmitOutcome::Invalid(errors) => Err(errors.into_error()),
        SubmitOutcome::AlreadySubmitting => Err(in_flight_error()),
        SubmitOutcome::Failed(failure) => Err(failure.to_error()),
    }
}

/// Fetch a patient user by id.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{userId}",
    params(("userId" = String, Path, description = "Identity service user id")),
    responses(
        (status = 200, description = "Patient user", body = PatientUserResponse),
        (status = 400, description = "Malformed user id", body = ErrorSchema),
        (status = 404, description = "No such user", body = ErrorSchema),
        (status = 503, description = "Identity service unavailable", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "getPatient"
)]
#[get("/patients/{userId}")]
pub async fn get_patient(
    state: web::Data<HttpState>,
    path: web::Path<PatientPath>,
) -> ApiResult<web::Json<PatientUserResponse>> {
    let user_id = parse_user_id(path.into_inner())?;
    let record = state
        .accounts
        .get_user(&user_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
    Ok(web::Json(PatientUserResponse::from(record)))
}

/// Validate the follow-up registration form for an existing user.
#[utoipa::path(
    post,
    path = "/api/v1/patients/{userId}/register",
    params(("userId" = String, Path, description = "Identity service user id")),
    request_body = RegistrationInputSchema,
    responses(
        (status = 200, description = "Normalised registration", body = PatientRegistrationSchema),
        (status = 400, description = "Invalid registration fields", body = ErrorSchema),
        (status = 404, description = "No such user", body = ErrorSchema),
        (status = 503, description = "Identity service unavailable", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "registerPatient"
)]
#[post("/patients/{userId}/register")]
pub async fn register_patient(
    state: web::Data<HttpState>,
    path: web::Path<PatientPath>,
    payload: web::Json<RegistrationInput>,
) -> ApiResult<web::Json<PatientRegistration>> {
    let user_id = parse_user_id(path.into_inner())?;
    let today = Utc::now().date_naive();
    let registration = state
        .registration
        .register(user_id, &payload, today)
        .await?;
    Ok(web::Json(registration))
}

/// Option lists for the registration form.
#[utoipa::path(
    get,
    path = "/api/v1/intake/options",
    responses(
        (
            status = 200,
            description = "Genders, physicians and identification types",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = IntakeOptionsSchema
        )
    ),
    tags = ["patients"],
    operation_id = "intakeOptions"
)]
#[get("/intake/options")]
pub async fn intake_options() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "public, max-age=3600"))
        .json(IntakeOptions::current())
}

#[cfg(test)]
#[path = "patients_tests.rs"]
mod tests;
