//! Reqwest-backed identity directory adapter.
//!
//! This adapter owns transport details only: request serialisation, auth
//! headers, timeout and HTTP error mapping, and JSON decoding into domain
//! user records.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{CreateUserRequestDto, EqualQueryDto, UserDto, UserListDto};
use super::settings::IdentityConnection;
use crate::domain::ports::{IdentityDirectory, IdentityDirectoryError};
use crate::domain::{EmailAddress, NewPatientUser, UserRecord, UserRecordId};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";

/// Identity directory adapter calling the hosted users API.
pub struct IdentityHttpDirectory {
    client: Client,
    endpoint: Url,
    project_id: String,
    api_key: Zeroizing<String>,
}

impl IdentityHttpDirectory {
    /// Build an adapter using a reqwest client with the connection's request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(connection: IdentityConnection) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(connection.timeout).build()?;
        Ok(Self {
            client,
            endpoint: connection.endpoint,
            project_id: connection.project_id,
            api_key: connection.api_key,
        })
    }

    fn url(&self, path: &str) -> Result<Url, IdentityDirectoryError> {
        self.endpoint.join(path).map_err(|error| {
            IdentityDirectoryError::invalid_request(format!("cannot build URL for {path}: {error}"))
        })
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(PROJECT_HEADER, self.project_id.as_str())
            .header(KEY_HEADER, self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, IdentityDirectoryError> {
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        decode(body.as_ref())
    }
}

#[async_trait]
impl IdentityDirectory for IdentityHttpDirectory {
    async fn create(
        &self,
        id: &UserRecordId,
        user: &NewPatientUser,
    ) -> Result<UserRecord, IdentityDirectoryError> {
        let response = self
            .authorised(self.client.post(self.url("users")?))
            .json(&CreateUserRequestDto::new(id, user))
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read::<UserDto>(response)
            .await?
            .into_domain()
            .map_err(IdentityDirectoryError::decode)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Vec<UserRecord>, IdentityDirectoryError> {
        let query = serde_json::to_string(&EqualQueryDto::email(email.as_ref())).map_err(|error| {
            IdentityDirectoryError::invalid_request(format!("cannot encode email query: {error}"))
        })?;
        let response = self
            .authorised(self.client.get(self.url("users")?))
            .query(&[("queries[]", query)])
            .send()
            .await
            .map_err(map_transport_error)?;
        let list = Self::read::<UserListDto>(response).await?;
        debug!(total = list.total, returned = list.users.len(), "listed users by email");
        list.into_domain().map_err(IdentityDirectoryError::decode)
    }

    async fn get(&self, id: &UserRecordId) -> Result<UserRecord, IdentityDirectoryError> {
        let response = self
            .authorised(self.client.get(self.url(&format!("users/{id}"))?))
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read::<UserDto>(response)
            .await?
            .into_domain()
            .map_err(IdentityDirectoryError::decode)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, IdentityDirectoryError> {
    serde_json::from_slice(body).map_err(|error| {
        IdentityDirectoryError::decode(format!("invalid users API payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> IdentityDirectoryError {
    if error.is_timeout() {
        IdentityDirectoryError::timeout(error.to_string())
    } else {
        IdentityDirectoryError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityDirectoryError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::CONFLICT => IdentityDirectoryError::conflict(message),
        StatusCode::NOT_FOUND => IdentityDirectoryError::not_found(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            IdentityDirectoryError::unauthorized(message)
        }
        StatusCode::TOO_MANY_REQUESTS => IdentityDirectoryError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            IdentityDirectoryError::timeout(message)
        }
        _ if status.is_client_error() => IdentityDirectoryError::invalid_request(message),
        _ => IdentityDirectoryError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network mapping helpers.

    use std::time::Duration;

    use super::*;
    use crate::domain::UserDataInput;
    use rstest::rstest;

    fn directory(endpoint: &str) -> IdentityHttpDirectory {
        IdentityHttpDirectory::new(IdentityConnection {
            endpoint: Url::parse(endpoint).expect("valid endpoint"),
            project_id: "carepulse".to_owned(),
            api_key: Zeroizing::new("secret".to_owned()),
            timeout: Duration::from_secs(1),
        })
        .expect("client builds")
    }

    #[rstest]
    #[case::conflict(StatusCode::CONFLICT, "Conflict")]
    #[case::not_found(StatusCode::NOT_FOUND, "NotFound")]
    #[case::unauthorised(StatusCode::UNAUTHORIZED, "Unauthorized")]
    #[case::forbidden(StatusCode::FORBIDDEN, "Unauthorized")]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, "RateLimited")]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, "Timeout")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::bad_request(StatusCode::BAD_REQUEST, "InvalidRequest")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, "Transport")]
    fn maps_http_statuses_to_port_errors(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, br#"{"message":"x","type":"user_already_exists"}"#);
        let matched = match expected {
            "Conflict" => matches!(error, IdentityDirectoryError::Conflict { .. }),
            "NotFound" => matches!(error, IdentityDirectoryError::NotFound { .. }),
            "Unauthorized" => matches!(error, IdentityDirectoryError::Unauthorized { .. }),
            "RateLimited" => matches!(error, IdentityDirectoryError::RateLimited { .. }),
            "Timeout" => matches!(error, IdentityDirectoryError::Timeout { .. }),
            "InvalidRequest" => matches!(error, IdentityDirectoryError::InvalidRequest { .. }),
            "Transport" => matches!(error, IdentityDirectoryError::Transport { .. }),
            _ => panic!("unsupported test expectation: {expected}"),
        };
        assert!(matched, "{status} should map to {expected}, got {error:?}");
    }

    #[test]
    fn status_messages_include_a_compact_body_preview() {
        let body = b"{\n  \"message\": \"bad phone\"\n}";
        let error = map_status_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            error.to_string(),
            "identity request invalid: status 400: { \"message\": \"bad phone\" }"
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let preview = body_preview("x".repeat(400).as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn decodes_user_payloads_ignoring_extra_fields() {
        let body = br#"{
            "$id": "abc123",
            "$createdAt": "2024-06-01T00:00:00.000+00:00",
            "name": "John Doe",
            "email": "john@example.com",
            "phone": "+13131234567",
            "status": true
        }"#;
        let record = decode::<UserDto>(body)
            .expect("decodes")
            .into_domain()
            .expect("valid id");
        assert_eq!(record.id.as_ref(), "abc123");
        assert_eq!(record.phone, "+13131234567");
    }

    #[test]
    fn decodes_user_lists_in_order() {
        let body = br#"{"total": 2, "users": [
            {"$id": "first1", "email": "john@example.com"},
            {"$id": "second2", "email": "john@example.com"}
        ]}"#;
        let records = decode::<UserListDto>(body)
            .expect("decodes")
            .into_domain()
            .expect("valid ids");
        let ids: Vec<_> = records.iter().map(|record| record.id.as_ref()).collect();
        assert_eq!(ids, ["first1", "second2"]);
    }

    #[test]
    fn malformed_payloads_are_decode_errors() {
        let error = decode::<UserDto>(b"<html>").expect_err("not json");
        assert!(matches!(error, IdentityDirectoryError::Decode { .. }));
    }

    #[test]
    fn email_query_uses_equal_filter_syntax() {
        let query = serde_json::to_string(&EqualQueryDto::email("john@example.com"))
            .expect("serialises");
        assert_eq!(
            query,
            r#"{"method":"equal","attribute":"email","values":["john@example.com"]}"#
        );
    }

    #[test]
    fn create_body_carries_the_chosen_id_and_an_e164_phone() {
        let user = NewPatientUser::validate(&UserDataInput {
            name: "John Doe".to_owned(),
            email: "john@example.com".to_owned(),
            phone: "(313) 123-4567".to_owned(),
        })
        .expect("valid");
        let id = UserRecordId::new("abc123").expect("valid id");
        let body = serde_json::to_value(CreateUserRequestDto::new(&id, &user)).expect("serialises");
        assert_eq!(
            body,
            serde_json::json!({
                "userId": "abc123",
                "email": "john@example.com",
                "phone": "+13131234567",
                "name": "John Doe"
            })
        );
    }

    #[test]
    fn urls_are_joined_under_the_endpoint() {
        let directory = directory("https://cloud.appwrite.io/v1/");
        let url = directory.url("users/abc123").expect("joins");
        assert_eq!(url.as_str(), "https://cloud.appwrite.io/v1/users/abc123");
    }
}
