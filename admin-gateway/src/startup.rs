use crate::config::{get_configuration, Settings, SettingsError, TelemetrySettings};
use crate::error::GatewayError;
use crate::models::session::SessionProvider;
use crate::services::operations::AdminOperations;
use service_core::observability::{init_tracing, TelemetryError};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("Failed to build admin client: {0}")]
    Client(#[from] GatewayError),
}

pub fn init_telemetry(settings: &TelemetrySettings) -> Result<(), TelemetryError> {
    init_tracing(
        &settings.service_name,
        &settings.log_level,
        settings.otlp_endpoint.as_deref(),
    )
}

/// Load configuration, install tracing and build the operations facade.
pub fn bootstrap(sessions: Arc<dyn SessionProvider>) -> Result<AdminOperations, StartupError> {
    let settings: Settings = get_configuration()?;
    init_telemetry(&settings.telemetry)?;

    Ok(AdminOperations::new(settings, sessions)?)
}

