//! Server configuration loading from file and environment variables.

use callweave_calls::TelephonyConfig;
use callweave_voice::SynthesisConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Telephony provider credentials.
    #[serde(default)]
    pub telephony: TelephonyConfig,

    /// Speech synthesis provider settings.
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Audio cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Call registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Audio cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the fingerprint-named audio artifacts.
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

/// Call registry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Idle time after which a call context is swept. 0 disables the sweep.
    #[serde(default = "default_context_ttl_seconds")]
    pub context_ttl_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "callweave_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8000
}

fn default_cache_dir() -> String {
    "audio_cache".to_string()
}

fn default_context_ttl_seconds() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            context_ttl_seconds: default_context_ttl_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `CALLWEAVE_HOST` overrides `server.host`
/// - `CALLWEAVE_PORT` overrides `server.port`
/// - `CALLWEAVE_TELEPHONY_SID` overrides `telephony.account_sid`
/// - `CALLWEAVE_TELEPHONY_KEY` overrides `telephony.api_key`
/// - `CALLWEAVE_TELEPHONY_TOKEN` overrides `telephony.api_token`
/// - `CALLWEAVE_TELEPHONY_NUMBER` overrides `telephony.phone_number`
/// - `CALLWEAVE_SYNTHESIS_KEY` overrides `synthesis.api_key`
/// - `CALLWEAVE_VOICE_ID` overrides `synthesis.voice_id`
/// - `CALLWEAVE_CACHE_DIR` overrides `cache.dir`
/// - `CALLWEAVE_LOG_LEVEL` overrides `logging.level`
/// - `CALLWEAVE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("CALLWEAVE_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("CALLWEAVE_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(sid) = std::env::var("CALLWEAVE_TELEPHONY_SID") {
        config.telephony.account_sid = sid;
    }
    if let Ok(key) = std::env::var("CALLWEAVE_TELEPHONY_KEY") {
        config.telephony.api_key = key;
    }
    if let Ok(token) = std::env::var("CALLWEAVE_TELEPHONY_TOKEN") {
        config.telephony.api_token = token;
    }
    if let Ok(number) = std::env::var("CALLWEAVE_TELEPHONY_NUMBER") {
        config.telephony.phone_number = number;
    }
    if let Ok(key) = std::env::var("CALLWEAVE_SYNTHESIS_KEY") {
        config.synthesis.api_key = key;
    }
    if let Ok(voice) = std::env::var("CALLWEAVE_VOICE_ID") {
        config.synthesis.voice_id = voice;
    }
    if let Ok(dir) = std::env::var("CALLWEAVE_CACHE_DIR") {
        config.cache.dir = dir;
    }
    if let Ok(level) = std::env::var("CALLWEAVE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("CALLWEAVE_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}
