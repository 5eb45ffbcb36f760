//! Configuration loading for the card generator service
//!
//! Bootstrap configuration is resolved once at startup and passed by value
//! into the components that need it. Priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Built-in defaults (fallback)
//!
//! A missing default config file is not an error: the service logs a warning
//! and starts with defaults. A file named explicitly (CLI or `MCG_CONFIG`)
//! must exist and parse.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MCG_CONFIG";

/// Environment variable holding the generative backend credential
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable holding the Mochi credential
pub const MOCHI_API_KEY_ENV: &str = "MOCHI_API_KEY";

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "mochi-cardgen";

/// Complete service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub mochi: MochiConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr only if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Generative backend configuration
#[derive(Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    /// Request the JSON-object response format
    #[serde(default = "default_true")]
    pub json_mode: bool,
    #[serde(default = "default_openai_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            json_mode: true,
            timeout_secs: default_openai_timeout_secs(),
            api_key: None,
        }
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("json_mode", &self.json_mode)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

/// Mochi flashcard service configuration
#[derive(Clone, Deserialize)]
pub struct MochiConfig {
    #[serde(default = "default_mochi_base_url")]
    pub base_url: String,
    #[serde(default = "default_mochi_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for MochiConfig {
    fn default() -> Self {
        Self {
            base_url: default_mochi_base_url(),
            timeout_secs: default_mochi_timeout_secs(),
            api_key: None,
        }
    }
}

impl fmt::Debug for MochiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MochiConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

/// Generation pipeline tuning
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Total model calls per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Notes shorter than this (after trimming) skip the model entirely
    #[serde(default = "default_min_note_chars")]
    pub min_note_chars: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            min_note_chars: default_min_note_chars(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_timeout_secs() -> u64 {
    60
}

fn default_mochi_base_url() -> String {
    "https://app.mochi.cards/api".to_string()
}

fn default_mochi_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_min_note_chars() -> usize {
    50
}

fn redact(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from all sources
    ///
    /// TOML file first, then environment secrets, then CLI overrides.
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let explicit = overrides
            .config_path
            .clone()
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from));

        let mut config = load_toml_config(explicit.as_deref())?;
        config.apply_environment();
        config.apply_overrides(overrides);
        Ok(config)
    }

    /// Resolve secrets, environment taking priority over TOML
    pub fn apply_environment(&mut self) {
        self.openai.api_key = resolve_secret(
            OPENAI_API_KEY_ENV,
            std::env::var(OPENAI_API_KEY_ENV).ok(),
            self.openai.api_key.take(),
        );
        self.mochi.api_key = resolve_secret(
            MOCHI_API_KEY_ENV,
            std::env::var(MOCHI_API_KEY_ENV).ok(),
            self.mochi.api_key.take(),
        );
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Parse configuration from a TOML string
pub fn parse_toml_config(content: &str) -> Result<ServiceConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load the TOML config file
///
/// With an explicit path the file must exist. Without one, the platform
/// default location is tried and defaults are used if it is absent.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<ServiceConfig> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = parse_toml_config(&content)?;
        info!("Loaded configuration from {}", path.display());
        return Ok(config);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(&path)?;
            let config = parse_toml_config(&content)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        Some(path) => {
            warn!(
                "Config file not found at {}, using built-in defaults",
                path.display()
            );
            Ok(ServiceConfig::default())
        }
        None => {
            warn!("Could not determine config directory, using built-in defaults");
            Ok(ServiceConfig::default())
        }
    }
}

/// Default config file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join("config.toml"))
}

/// Pick a secret from environment or TOML
///
/// Environment wins. Blank values count as absent.
pub fn resolve_secret(
    name: &str,
    env_value: Option<String>,
    toml_value: Option<String>,
) -> Option<String> {
    let env_value = env_value.filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v));

    match (env_value, toml_value) {
        (Some(key), Some(_)) => {
            warn!(
                "{} found in both environment and TOML config. Using environment.",
                name
            );
            Some(key)
        }
        (Some(key), None) => {
            info!("{} loaded from environment variable", name);
            Some(key)
        }
        (None, Some(key)) => {
            info!("{} loaded from TOML config", name);
            Some(key)
        }
        (None, None) => None,
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
