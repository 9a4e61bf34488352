//! Patient intake entry-point: loads settings, wires the identity directory
//! and serves the REST API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use patient_intake::inbound::http::health::HealthState;
use patient_intake::outbound::identity::IdentitySettings;
use server::{IntakeSettings, ServerConfig, build_accounts, create_server};

fn load_settings() -> std::io::Result<(IntakeSettings, IdentitySettings)> {
    let intake = IntakeSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load intake settings: {e}")))?;
    let identity = IdentitySettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load identity settings: {e}")))?;
    Ok((intake, identity))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let (intake, identity) = load_settings()?;
    let accounts = build_accounts(&identity, intake.allow_fixture)?;
    let bind_addr = intake.bind_addr();
    let country = intake
        .country_code()
        .map_err(|e| std::io::Error::other(format!("invalid INTAKE_DEFAULT_COUNTRY_CODE: {e}")))?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(bind_addr, accounts).with_country(country);
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "patient intake listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result
}
