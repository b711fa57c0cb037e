use crate::models::MatchingRules;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub model: ModelSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    #[serde(default = "default_users_collection")]
    pub users_collection: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_users_collection() -> String { "users".to_string() }
fn default_page_size() -> usize { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    #[serde(default = "default_model_endpoint")]
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_model_name")]
    pub model: String,
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

fn default_model_endpoint() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_model_name() -> String { "gemini-2.0-flash-exp".to_string() }
fn default_model_timeout() -> u64 { 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_max_starters")]
    pub max_starters: usize,
    #[serde(default = "default_reason_word_limit")]
    pub reason_word_limit: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_results: default_max_results(),
            max_starters: default_max_starters(),
            reason_word_limit: default_reason_word_limit(),
        }
    }
}

impl From<&MatchingSettings> for MatchingRules {
    fn from(settings: &MatchingSettings) -> Self {
        Self {
            min_score: settings.min_score,
            max_results: settings.max_results,
            max_starters: settings.max_starters,
            reason_word_limit: settings.reason_word_limit,
        }
    }
}

fn default_min_score() -> f64 { 50.0 }
fn default_max_results() -> usize { 20 }
fn default_max_starters() -> usize { 5 }
fn default_reason_word_limit() -> usize { 50 }

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
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with BUDDY__)
    /// 5. Secrets from plain environment variables (GEMINI_API_KEY, JWT_SECRET, APPWRITE_API_KEY)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., BUDDY__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("BUDDY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_secrets(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("BUDDY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_secrets(settings)?.try_deserialize()
    }
}

/// Override secret values from the conventional environment variables
fn substitute_secrets(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in [
        ("GEMINI_API_KEY", "model.api_key"),
        ("JWT_SECRET", "auth.jwt_secret"),
        ("APPWRITE_API_KEY", "store.api_key"),
    ] {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
