//! HTTP server configuration object and helpers.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use patient_intake::domain::ports::PatientAccounts;
use patient_intake::domain::{CountryCode, PatientValidationError};

/// Listener and fallback settings read from `INTAKE_*` variables.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "INTAKE")]
pub struct IntakeSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// Serve from the in-memory identity directory when no identity service
    /// is configured, even in release builds.
    #[ortho_config(default = false)]
    pub allow_fixture: bool,
    /// Calling code for phone numbers entered without a leading `+`.
    pub default_country_code: Option<String>,
}

impl IntakeSettings {
    /// Configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)))
    }

    /// Configured calling code, falling back to the domain default.
    ///
    /// # Errors
    /// Returns [`PatientValidationError::InvalidCountryCode`] when the
    /// configured value is not a calling code.
    pub fn country_code(&self) -> Result<CountryCode, PatientValidationError> {
        self.default_country_code
            .as_deref()
            .map_or_else(|| Ok(CountryCode::default()), CountryCode::new)
    }
}

/// Configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) accounts: Arc<dyn PatientAccounts>,
    pub(crate) country: CountryCode,
}

impl ServerConfig {
    /// Construct a server configuration around the accounts use case.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, accounts: Arc<dyn PatientAccounts>) -> Self {
        Self {
            bind_addr,
            accounts,
            country: CountryCode::default(),
        }
    }

    /// Set the calling code applied to national phone numbers.
    #[must_use]
    pub fn with_country(mut self, country: CountryCode) -> Self {
        self.country = country;
        self
    }
}
