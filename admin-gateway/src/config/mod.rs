use serde::Deserialize;
use service_core::config::load_layered;
use std::time::Duration;
use validator::Validate;

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub backend: BackendSettings,
    pub authorization: AuthorizationSettings,
    #[serde(default)]
    #[validate(nested)]
    pub operations: OperationSettings,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct BackendSettings {
    /// Base URL of the admin REST API (e.g., https://api.eldonia-nex.example).
    #[validate(url)]
    pub url: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl BackendSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

/// Role enforcement switch. Deliberately has no default: a deployment must
/// state whether admin/role checks are on.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthorizationSettings {
    pub enforce_authorization: bool,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct OperationSettings {
    #[serde(default = "default_timeout_ms")]
    #[validate(range(min = 1))]
    pub timeout_ms: u64,
    /// Exports stream whole tables and get a longer deadline.
    #[serde(default = "default_export_timeout_ms")]
    #[validate(range(min = 1))]
    pub export_timeout_ms: u64,
}

impl OperationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn export_timeout(&self) -> Duration {
        Duration::from_millis(self.export_timeout_ms)
    }
}

impl Default for OperationSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            export_timeout_ms: default_export_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_export_timeout_ms() -> u64 {
    60_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadSettings {
    #[serde(default = "default_max_upload_bytes")]
    pub max_size_bytes: u64,
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_upload_bytes(),
            allowed_content_types: default_allowed_content_types(),
        }
    }
}

fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_allowed_content_types() -> Vec<String> {
    ["image/png", "image/jpeg", "image/webp", "application/pdf"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint; spans are only exported when set.
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_service_name() -> String {
    "admin-gateway".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Loads `config/base.yaml` (optional) overlaid with `GATEWAY__*` variables.
pub fn get_configuration() -> Result<Settings, SettingsError> {
    dotenvy::dotenv().ok();

    let settings: Settings = load_layered("admin-gateway", "GATEWAY")?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<Settings, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_defaults_applied() {
        let settings = parse(
            r#"
backend:
  url: "http://localhost:9000"
authorization:
  enforce_authorization: true
"#,
        )
        .unwrap();

        assert!(settings.authorization.enforce_authorization);
        assert_eq!(settings.backend.connect_timeout_ms, 5_000);
        assert_eq!(settings.operations.timeout(), Duration::from_secs(30));
        assert_eq!(settings.operations.export_timeout(), Duration::from_secs(60));
        assert_eq!(settings.upload.max_size_bytes, 10 * 1024 * 1024);
        assert!(settings
            .upload
            .allowed_content_types
            .contains(&"application/pdf".to_string()));
        assert!(settings.telemetry.otlp_endpoint.is_none());
    }

    #[test]
    fn test_enforce_authorization_is_required() {
        let result = parse(
            r#"
backend:
  url: "http://localhost:9000"
authorization: {}
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_backend_url_is_validated() {
        let settings = parse(
            r#"
backend:
  url: "not a url"
authorization:
  enforce_authorization: false
"#,
        )
        .unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_operation_timeout_is_rejected() {
        let settings = parse(
            r#"
backend:
  url: "http://localhost:9000"
authorization:
  enforce_authorization: true
operations:
  timeout_ms: 0
"#,
        )
        .unwrap();

        let errors = settings.validate().unwrap_err();
        assert!(errors.errors().contains_key("operations"));
    }

    #[test]
    fn test_zero_export_timeout_is_rejected() {
        let mut settings = parse(
            r#"
backend:
  url: "http://localhost:9000"
authorization:
  enforce_authorization: true
"#,
        )
        .unwrap();
        assert!(settings.validate().is_ok());

        settings.operations.export_timeout_ms = 0;
        assert!(settings.validate().is_err());
    }
}
