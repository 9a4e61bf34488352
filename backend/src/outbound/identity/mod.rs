//! Identity service outbound adapters.
//!
//! A reqwest implementation of the `IdentityDirectory` port against the
//! hosted users REST API, plus the settings that configure it.

mod dto;
mod http_directory;
mod settings;

pub use http_directory::IdentityHttpDirectory;
pub use settings::{
    DEFAULT_REQUEST_TIMEOUT_SECS, IdentityConnection, IdentitySettings, IdentitySettingsError,
};
