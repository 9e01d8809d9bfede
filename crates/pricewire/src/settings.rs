//! Application configuration.
//!
//! Layering: built-in defaults, then the TOML config file, then
//! `PRICEWIRE__`-prefixed environment variables.

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "PRICEWIRE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret for validating bearer tokens. Required for `serve`.
    pub jwt_secret: Option<String>,
    /// Origins the CORS layer allows. Empty means local dev defaults.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Whether to forward updates to the notification service at all.
    pub enabled: bool,
    /// Base URL of the external notification service.
    pub base_url: String,
    /// Request timeout for relay deliveries.
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:3001".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Load configuration, layering the file over defaults and the environment
/// over the file.
pub fn load(config_file: &Path) -> Result<AppConfig> {
    let built = Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080_i64)?
        .set_default("logging.level", "info")?
        .set_default("relay.enabled", true)?
        .set_default("relay.base_url", "http://localhost:3001")?
        .set_default("relay.timeout_secs", 5_i64)?
        .add_source(
            File::from(config_file)
                .format(FileFormat::Toml)
                .required(false),
        )
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .context("building configuration")?;

    let mut config: AppConfig = built
        .try_deserialize()
        .context("deserializing configuration")?;

    if let Some(ref file) = config.logging.file {
        let expanded = shellexpand::full(file).context("expanding log file path")?;
        config.logging.file = Some(expanded.to_string());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("missing.toml")).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
        assert!(config.auth.jwt_secret.is_none());
        assert!(config.relay.enabled);
        assert_eq!(config.relay.base_url, "http://localhost:3001");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000

[logging]
level = "debug"

[auth]
jwt_secret = "file-secret"
allowed_origins = ["https://app.example.com"]

[relay]
enabled = false
base_url = "http://relay.internal:3001"
"#
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("file-secret"));
        assert_eq!(config.auth.allowed_origins.len(), 1);
        assert!(!config.relay.enabled);
        assert_eq!(config.relay.base_url, "http://relay.internal:3001");
    }
}
