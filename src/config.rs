use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::Credentials;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub token: TokenSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Clone, Deserialize)]
pub struct ProviderSettings {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub error_policy: UpstreamErrorPolicy,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("error_policy", &self.error_policy)
            .finish()
    }
}

fn default_base_url() -> String { "https://test.api.amadeus.com".to_string() }

/// How upstream failures surface to API callers.
///
/// Applied the same way to every provider operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamErrorPolicy {
    /// 200 with an `{"error": "..."}` body
    #[default]
    Embed,
    /// 502/504 with a structured error body
    Status,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSettings {
    #[serde(default)]
    pub cache_enabled: bool,
    #[serde(default = "default_expiry_margin")]
    pub expiry_margin_secs: u64,
    #[serde(default = "default_token_ttl")]
    pub default_ttl_secs: u64,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            cache_enabled: false,
            expiry_margin_secs: default_expiry_margin(),
            default_ttl_secs: default_token_ttl(),
        }
    }
}

fn default_expiry_margin() -> u64 { 30 }
fn default_token_ttl() -> u64 { 1799 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables (prefixed with FLIGHTS__)
    /// 4. AMADEUS_CLIENT_ID / AMADEUS_CLIENT_SECRET / AMADEUS_BASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Development overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., FLIGHTS__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("FLIGHTS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_provider_env(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("FLIGHTS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_provider_env(settings)?.try_deserialize()
    }

    /// Provider credentials, detached from the rest of the settings
    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.provider.client_id.clone(),
            client_secret: self.provider.client_secret.clone(),
            base_url: self.provider.base_url.clone(),
        }
    }
}

/// Override provider settings from the conventional AMADEUS_* variables
fn apply_provider_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("provider.client_id", "AMADEUS_CLIENT_ID"),
        ("provider.client_secret", "AMADEUS_CLIENT_SECRET"),
        ("provider.base_url", "AMADEUS_BASE_URL"),
    ];

    let mut builder = Config::builder().add_source(settings);

    for (key, var) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
