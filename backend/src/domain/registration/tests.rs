//! Tests for registration validation and the registration use case.

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockPatientAccounts;
use crate::domain::{ErrorCode, UserRecord};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
}

fn user_id() -> UserRecordId {
    UserRecordId::new("abc123").expect("valid id")
}

#[fixture]
fn form() -> RegistrationInput {
    RegistrationInput {
        name: "John Doe".to_owned(),
        email: "John@Example.com".to_owned(),
        phone: "+1 (313) 123-4567".to_owned(),
        birth_date: "1985-04-12".to_owned(),
        gender: "male".to_owned(),
        address: "14 Street, New York, NY 5101".to_owned(),
        occupation: "Software Engineer".to_owned(),
        emergency_contact_name: "Jane Doe".to_owned(),
        emergency_contact_number: "3137654321".to_owned(),
        primary_physician: "Leila Cameron".to_owned(),
        insurance_provider: "BlueCross BlueShield".to_owned(),
        insurance_policy_number: "ABC123456789".to_owned(),
        allergies: Some("Peanuts, Penicillin".to_owned()),
        current_medication: Some("  ".to_owned()),
        family_medical_history: None,
        past_medical_history: None,
        identification_type: Some("passport".to_owned()),
        identification_number: Some("123456789".to_owned()),
        identification_document: Some(IdentificationDocument {
            file_name: "passport.png".to_owned(),
            content_type: "IMAGE/PNG".to_owned(),
            size_bytes: 2048,
        }),
        treatment_consent: true,
        disclosure_consent: true,
        privacy_consent: true,
    }
}

fn failed_fields(errors: &FieldErrors) -> Vec<(&'static str, &'static str)> {
    errors
        .as_slice()
        .iter()
        .map(|error| (error.field, error.code))
        .collect()
}

#[rstest]
fn valid_form_is_normalised(form: RegistrationInput) {
    let registration =
        PatientRegistration::validate(user_id(), &form, today()).expect("form is valid");

    assert_eq!(registration.personal.email.as_ref(), "john@example.com");
    assert_eq!(registration.personal.phone.as_ref(), "+13131234567");
    assert_eq!(registration.personal.gender, Gender::Male);
    assert_eq!(registration.medical.primary_physician, "Leila Cameron");
    assert_eq!(registration.medical.current_medication, None);
    assert_eq!(registration.identification.kind.as_deref(), Some("Passport"));
    let document = registration.identification.document.expect("document kept");
    assert_eq!(document.content_type, "image/png");
    assert!(registration.consents.privacy);
}

#[rstest]
fn national_numbers_use_the_configured_country(form: RegistrationInput) {
    let country = CountryCode::new("44").expect("valid country code");
    let registration =
        PatientRegistration::validate_with_country(user_id(), &form, today(), &country)
            .expect("form is valid");

    assert_eq!(registration.personal.phone.as_ref(), "+13131234567");
    assert_eq!(
        registration.personal.emergency_contact_number.as_ref(),
        "+443137654321"
    );
}

#[rstest]
fn identification_section_is_optional(mut form: RegistrationInput) {
    form.identification_type = Some(String::new());
    form.identification_number = None;
    form.identification_document = None;

    let registration =
        PatientRegistration::validate(user_id(), &form, today()).expect("form is valid");

    assert_eq!(registration.identification, Identification::default());
}

#[rstest]
#[case::future("2024-06-02", "future_date")]
#[case::too_early("1899-12-31", "date_too_early")]
#[case::malformed("12/04/1985", "invalid_date")]
#[case::blank(" ", "empty")]
fn rejects_bad_birth_dates(
    mut form: RegistrationInput,
    #[case] raw: &str,
    #[case] code: &'static str,
) {
    form.birth_date = raw.to_owned();

    let errors = PatientRegistration::validate(user_id(), &form, today()).expect_err("invalid");

    assert_eq!(failed_fields(&errors), [("birthDate", code)]);
}

#[rstest]
fn birth_date_of_today_is_accepted(mut form: RegistrationInput) {
    form.birth_date = "2024-06-01".to_owned();
    assert!(PatientRegistration::validate(user_id(), &form, today()).is_ok());
}

#[rstest]
fn collects_every_failing_field(mut form: RegistrationInput) {
    form.gender = "unknown".to_owned();
    form.address = "x".to_owned();
    form.emergency_contact_number = "12".to_owned();
    form.primary_physician = "Dr. Nobody".to_owned();
    form.insurance_policy_number = "P".repeat(SHORT_TEXT_MAX + 1);
    form.allergies = Some("a".repeat(MEDICAL_NOTE_MAX + 1));
    form.identification_type = Some("Library Card".to_owned());
    form.privacy_consent = false;

    let errors = PatientRegistration::validate(user_id(), &form, today()).expect_err("invalid");

    assert_eq!(
        failed_fields(&errors),
        [
            ("gender", "unknown_option"),
            ("address", "too_short"),
            ("emergencyContactNumber", "invalid_phone"),
            ("primaryPhysician", "unknown_option"),
            ("insurancePolicyNumber", "too_long"),
            ("allergies", "too_long"),
            ("identificationType", "unknown_option"),
            ("privacyConsent", "consent_required"),
        ]
    );
}

#[rstest]
#[case::oversized("scan.pdf", "application/pdf", DOCUMENT_MAX_BYTES + 1, "too_long")]
#[case::unsupported("scan.gif", "image/gif", 10, "unsupported_type")]
#[case::unnamed(" ", "image/png", 10, "empty")]
fn rejects_bad_documents(
    mut form: RegistrationInput,
    #[case] file_name: &str,
    #[case] content_type: &str,
    #[case] size_bytes: u64,
    #[case] code: &'static str,
) {
    form.identification_document = Some(IdentificationDocument {
        file_name: file_name.to_owned(),
        content_type: content_type.to_owned(),
        size_bytes,
    });

    let errors = PatientRegistration::validate(user_id(), &form, today()).expect_err("invalid");

    assert_eq!(failed_fields(&errors), [("identificationDocument", code)]);
}

#[rstest]
fn missing_consents_are_all_reported(mut form: RegistrationInput) {
    form.treatment_consent = false;
    form.disclosure_consent = false;
    form.privacy_consent = false;

    let errors = PatientRegistration::validate(user_id(), &form, today()).expect_err("invalid");

    assert!(errors.contains("treatmentConsent"));
    assert!(errors.contains("disclosureConsent"));
    assert!(errors.contains("privacyConsent"));
}

fn existing_user() -> UserRecord {
    UserRecord {
        id: user_id(),
        name: "John Doe".to_owned(),
        email: "john@example.com".to_owned(),
        phone: "3131234567".to_owned(),
    }
}

#[rstest]
#[tokio::test]
async fn register_confirms_the_user_exists(form: RegistrationInput) {
    let mut accounts = MockPatientAccounts::new();
    accounts
        .expect_get_user()
        .times(1)
        .withf(|id| id.as_ref() == "abc123")
        .return_once(|_| Ok(Some(existing_user())));
    let service = RegistrationService::new(Arc::new(accounts));

    let registration = service
        .register(user_id(), &form, today())
        .await
        .expect("registered");

    assert_eq!(registration.user_id, user_id());
}

#[rstest]
#[tokio::test]
async fn register_reports_unknown_users(form: RegistrationInput) {
    let mut accounts = MockPatientAccounts::new();
    accounts.expect_get_user().return_once(|_| Ok(None));
    let service = RegistrationService::new(Arc::new(accounts));

    let err = service
        .register(user_id(), &form, today())
        .await
        .expect_err("unknown user");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn invalid_forms_never_reach_the_directory(mut form: RegistrationInput) {
    form.gender = String::new();
    let mut accounts = MockPatientAccounts::new();
    accounts.expect_get_user().never();
    let service = RegistrationService::new(Arc::new(accounts));

    let err = service
        .register(user_id(), &form, today())
        .await
        .expect_err("invalid form");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "gender must be one of Male, Female or Other");
}

#[rstest]
#[tokio::test]
async fn register_surfaces_directory_failures(form: RegistrationInput) {
    let mut accounts = MockPatientAccounts::new();
    accounts
        .expect_get_user()
        .return_once(|_| Err(crate::domain::Error::service_unavailable("identity service down")));
    let service = RegistrationService::new(Arc::new(accounts));

    let err = service
        .register(user_id(), &form, today())
        .await
        .expect_err("directory failure");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
