//! Tests for the create-or-fetch patient account service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{FixtureIdentityDirectory, MockIdentityDirectory};
use crate::domain::{ErrorCode, UserDataInput};

#[fixture]
fn john() -> NewPatientUser {
    NewPatientUser::validate(&UserDataInput {
        name: "John Doe".to_owned(),
        email: "john@example.com".to_owned(),
        phone: "3131234567".to_owned(),
    })
    .expect("fixture is valid")
}

fn record(id: &str, user: &NewPatientUser) -> UserRecord {
    UserRecord {
        id: UserRecordId::new(id).expect("valid id"),
        name: user.name().to_string(),
        email: user.email().to_string(),
        phone: user.phone().to_string(),
    }
}

fn service(directory: MockIdentityDirectory) -> PatientAccountService<MockIdentityDirectory> {
    PatientAccountService::new(Arc::new(directory))
}

#[rstest]
#[tokio::test]
async fn valid_data_creates_exactly_once(john: NewPatientUser) {
    let created = record("abc123", &john);
    let mut directory = MockIdentityDirectory::new();
    directory
        .expect_create()
        .times(1)
        .withf(|id, user| !id.as_ref().is_empty() && user.email().as_ref() == "john@example.com")
        .return_once(move |_, _| Ok(created));
    directory.expect_find_by_email().never();

    let outcome = service(directory).create_user(&john).await;

    let record = outcome.record().expect("record returned");
    assert_eq!(record.id.as_ref(), "abc123");
    assert_eq!(record.registration_path(), "/patients/abc123/register");
    assert_eq!(outcome.label(), "created");
}

#[rstest]
#[tokio::test]
async fn each_create_uses_a_fresh_identifier(john: NewPatientUser) {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut directory = MockIdentityDirectory::new();
    directory.expect_create().times(2).returning(move |id, user| {
        sink.lock().expect("test lock").push(id.clone());
        Ok(UserRecord {
            id: id.clone(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            phone: user.phone().to_string(),
        })
    });

    let service = service(directory);
    service.create_user(&john).await;
    service.create_user(&john).await;

    let ids = seen.lock().expect("test lock");
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[rstest]
#[tokio::test]
async fn conflict_returns_first_existing_record(john: NewPatientUser) {
    let existing = record("existing1", &john);
    let other = record("existing2", &john);
    let mut directory = MockIdentityDirectory::new();
    directory
        .expect_create()
        .times(1)
        .return_once(|_, _| Err(IdentityDirectoryError::conflict("user_already_exists")));
    directory
        .expect_find_by_email()
        .times(1)
        .withf(|email| email.as_ref() == "john@example.com")
        .return_once(move |_| Ok(vec![existing, other]));

    let outcome = service(directory).create_user(&john).await;

    match outcome {
        CreateUserOutcome::AlreadyExists(record) => assert_eq!(record.id.as_ref(), "existing1"),
        other => panic!("expected existing record, got {other:?}"),
    }
}

#[rstest]
#[case::timeout(IdentityDirectoryError::timeout("deadline"))]
#[case::unauthorized(IdentityDirectoryError::unauthorized("bad key"))]
#[case::invalid(IdentityDirectoryError::invalid_request("phone rejected"))]
#[tokio::test]
async fn non_conflict_failure_skips_lookup(
    john: NewPatientUser,
    #[case] failure: IdentityDirectoryError,
) {
    let expected = failure.clone();
    let mut directory = MockIdentityDirectory::new();
    directory
        .expect_create()
        .times(1)
        .return_once(move |_, _| Err(failure));
    directory.expect_find_by_email().never();

    let outcome = service(directory).create_user(&john).await;

    assert!(outcome.record().is_none());
    assert_eq!(
        outcome,
        CreateUserOutcome::Failed(CreateUserFailure::Remote(expected))
    );
}

#[rstest]
#[tokio::test]
async fn conflict_without_match_yields_no_record(john: NewPatientUser) {
    let mut directory = MockIdentityDirectory::new();
    directory
        .expect_create()
        .return_once(|_, _| Err(IdentityDirectoryError::conflict("exists")));
    directory
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(Vec::new()));

    let outcome = service(directory).create_user(&john).await;

    match outcome {
        CreateUserOutcome::Failed(failure @ CreateUserFailure::ConflictUnresolved { .. }) => {
            assert_eq!(failure.to_error().code(), ErrorCode::Conflict);
        }
        other => panic!("expected unresolved conflict, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn lookup_failure_after_conflict_is_reported(john: NewPatientUser) {
    let mut directory = MockIdentityDirectory::new();
    directory
        .expect_create()
        .return_once(|_, _| Err(IdentityDirectoryError::conflict("exists")));
    directory
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Err(IdentityDirectoryError::transport("connection reset")));

    let outcome = service(directory).create_user(&john).await;

    match outcome {
        CreateUserOutcome::Failed(failure @ CreateUserFailure::Lookup(_)) => {
            assert_eq!(failure.to_error().code(), ErrorCode::ServiceUnavailable);
        }
        other => panic!("expected lookup failure, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn same_email_twice_returns_same_record(john: NewPatientUser) {
    let service = PatientAccountService::new(Arc::new(FixtureIdentityDirectory::default()));

    let first = service.create_user(&john).await;
    let second = service.create_user(&john).await;

    assert_eq!(first.label(), "created");
    assert_eq!(second.label(), "existing");
    assert_eq!(
        first.record().map(|r| r.id.clone()),
        second.record().map(|r| r.id.clone())
    );
}

#[rstest]
#[tokio::test]
async fn get_user_maps_not_found_to_none() {
    let mut directory = MockIdentityDirectory::new();
    directory
        .expect_get()
        .return_once(|_| Err(IdentityDirectoryError::not_found("abc123")));

    let id = UserRecordId::new("abc123").expect("valid id");
    let result = service(directory).get_user(&id).await.expect("not an error");
    assert!(result.is_none());
}

#[rstest]
#[case(IdentityDirectoryError::timeout("slow"), ErrorCode::ServiceUnavailable)]
#[case(IdentityDirectoryError::decode("garbage"), ErrorCode::InternalError)]
#[tokio::test]
async fn get_user_surfaces_other_failures(
    #[case] failure: IdentityDirectoryError,
    #[case] expected: ErrorCode,
) {
    let mut directory = MockIdentityDirectory::new();
    directory.expect_get().return_once(move |_| Err(failure));

    let id = UserRecordId::new("abc123").expect("valid id");
    let err = service(directory)
        .get_user(&id)
        .await
        .expect_err("failure is surfaced");
    assert_eq!(err.code(), expected);
}
