//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Salary import configuration.
    #[serde(default)]
    pub import: ImportConfig,
    /// Business calendar configuration.
    #[serde(default)]
    pub business: BusinessConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    28800 // 8 hours, one working day
}

/// Salary import configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// How long a job's progress record stays pollable.
    #[serde(default = "default_progress_ttl")]
    pub progress_ttl_secs: u64,
    /// Maximum number of progress records kept at once.
    #[serde(default = "default_progress_capacity")]
    pub progress_capacity: u64,
    /// Directory used to stage uploaded spreadsheets.
    #[serde(default = "default_staging_root")]
    pub staging_root: PathBuf,
    /// Largest accepted upload, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_progress_ttl() -> u64 {
    3600
}

fn default_progress_capacity() -> u64 {
    1_000
}

fn default_staging_root() -> PathBuf {
    std::env::temp_dir().join("payroll-uploads")
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            progress_ttl_secs: default_progress_ttl(),
            progress_capacity: default_progress_capacity(),
            staging_root: default_staging_root(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Business calendar configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessConfig {
    /// IANA time zone that defines "today" and "this month".
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

fn default_time_zone() -> String {
    "Africa/Cairo".to_string()
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PAYROLL").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
