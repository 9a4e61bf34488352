//! Identity service connection settings loaded via OrthoConfig.

use std::fmt;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use zeroize::Zeroizing;

/// Request timeout applied when `IDENTITY_REQUEST_TIMEOUT_SECS` is unset.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Raw identity settings as read from `IDENTITY_*` variables, CLI flags or
/// configuration files.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "IDENTITY")]
pub struct IdentitySettings {
    /// Base URL of the users API, for example `https://cloud.appwrite.io/v1`.
    pub endpoint: Option<String>,
    /// Project identifier sent as `X-Appwrite-Project`.
    pub project_id: Option<String>,
    /// Server API key sent as `X-Appwrite-Key`.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    #[ortho_config(default = 10)]
    pub request_timeout_secs: u64,
}

impl fmt::Debug for IdentitySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentitySettings")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Problems turning settings into a usable connection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentitySettingsError {
    #[error("identity setting {name} is required when any identity setting is provided")]
    Missing { name: &'static str },
    #[error("identity endpoint {endpoint} is not a valid absolute URL: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("identity request timeout must be at least one second")]
    ZeroTimeout,
}

/// Validated connection details for the identity service.
pub struct IdentityConnection {
    pub endpoint: Url,
    pub project_id: String,
    pub api_key: Zeroizing<String>,
    pub timeout: Duration,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

impl IdentitySettings {
    /// Configured request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether no identity setting was supplied at all.
    pub fn is_unset(&self) -> bool {
        [&self.endpoint, &self.project_id, &self.api_key]
            .into_iter()
            .all(|value| non_blank(value.as_deref()).is_none())
    }

    /// Validate into a connection, or `Ok(None)` when nothing is configured.
    ///
    /// # Errors
    ///
    /// Returns an error when the settings are only partially supplied or the
    /// endpoint does not parse.
    pub fn connection(&self) -> Result<Option<IdentityConnection>, IdentitySettingsError> {
        if self.is_unset() {
            return Ok(None);
        }
        let endpoint = non_blank(self.endpoint.as_deref())
            .ok_or(IdentitySettingsError::Missing { name: "endpoint" })?;
        let project_id = non_blank(self.project_id.as_deref())
            .ok_or(IdentitySettingsError::Missing { name: "project_id" })?;
        let api_key = non_blank(self.api_key.as_deref())
            .ok_or(IdentitySettingsError::Missing { name: "api_key" })?;
        if self.request_timeout_secs == 0 {
            return Err(IdentitySettingsError::ZeroTimeout);
        }

        // Joining relative paths needs a trailing slash on the base.
        let normalised = format!("{}/", endpoint.trim_end_matches('/'));
        let endpoint =
            Url::parse(&normalised).map_err(|error| IdentitySettingsError::InvalidEndpoint {
                endpoint: endpoint.to_owned(),
                reason: error.to_string(),
            })?;

        Ok(Some(IdentityConnection {
            endpoint,
            project_id: project_id.to_owned(),
            api_key: Zeroizing::new(api_key.to_owned()),
            timeout: self.request_timeout(),
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for identity settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> IdentitySettings {
        IdentitySettings::load_from_iter([OsString::from("patient-intake")])
            .expect("config should load")
    }

    fn settings(
        endpoint: Option<&str>,
        project: Option<&str>,
        key: Option<&str>,
    ) -> IdentitySettings {
        IdentitySettings {
            endpoint: endpoint.map(str::to_owned),
            project_id: project.map(str::to_owned),
            api_key: key.map(str::to_owned),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    #[rstest]
    fn missing_settings_mean_no_connection() {
        let _guard = lock_env([
            ("IDENTITY_ENDPOINT", None::<String>),
            ("IDENTITY_PROJECT_ID", None::<String>),
            ("IDENTITY_API_KEY", None::<String>),
            ("IDENTITY_REQUEST_TIMEOUT_SECS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.is_unset());
        assert_eq!(
            settings.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
        assert!(settings.connection().expect("valid").is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("IDENTITY_ENDPOINT", Some("https://cloud.appwrite.io/v1/".to_owned())),
            ("IDENTITY_PROJECT_ID", Some("carepulse".to_owned())),
            ("IDENTITY_API_KEY", Some("secret".to_owned())),
            ("IDENTITY_REQUEST_TIMEOUT_SECS", Some("3".to_owned())),
        ]);

        let connection = load_from_empty_args()
            .connection()
            .expect("valid")
            .expect("configured");
        assert_eq!(connection.endpoint.as_str(), "https://cloud.appwrite.io/v1/");
        assert_eq!(connection.project_id, "carepulse");
        assert_eq!(connection.api_key.as_str(), "secret");
        assert_eq!(connection.timeout, Duration::from_secs(3));
    }

    #[rstest]
    #[case(settings(Some("https://id.example"), None, Some("k")), "project_id")]
    #[case(settings(None, Some("p"), Some("k")), "endpoint")]
    #[case(settings(Some("https://id.example"), Some("p"), Some("  ")), "api_key")]
    fn partial_settings_are_rejected(#[case] settings: IdentitySettings, #[case] name: &str) {
        let Err(IdentitySettingsError::Missing { name: missing }) = settings.connection() else {
            panic!("expected missing setting");
        };
        assert_eq!(missing, name);
    }

    #[rstest]
    fn relative_endpoints_are_rejected() {
        let result = settings(Some("not a url"), Some("p"), Some("k")).connection();
        assert!(matches!(
            result,
            Err(IdentitySettingsError::InvalidEndpoint { .. })
        ));
    }

    #[rstest]
    fn debug_output_redacts_the_api_key() {
        let rendered = format!("{:?}", settings(None, None, Some("hunter2")));
        assert!(!rendered.contains("hunter2"));
    }
}
