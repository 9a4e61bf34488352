//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod patients;
pub mod schemas;
pub mod state;

pub use error::ApiResult;

/// Versioned API scope with every patient intake endpoint mounted.
///
/// Callers supply [`state::HttpState`] and [`error::json_config`] as app data.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use patient_intake::inbound::http::{api_scope, error::json_config};
///
/// let _app = App::new().app_data(json_config()).service(api_scope());
/// ```
pub fn api_scope() -> actix_web::Scope {
    actix_web::web::scope("/api/v1")
        .service(patients::create_patient)
        .service(patients::get_patient)
        .service(patients::register_patient)
        .service(patients::intake_options)
}
