//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Searches the standard locations for a config file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `MCREPORT_ENDPOINT`: SOAP endpoint URL (required)
//! - `MCREPORT_USERNAME`: API user (required)
//! - `MCREPORT_PASSWORD`: API password (required)
//! - `MCREPORT_CLIENT_ID`: Business unit (MID) new queries are scoped to
//! - `MCREPORT_HTTP_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `MCREPORT_HTTP_MAX_ATTEMPTS`: Attempts per request, retries included
//! - `MCREPORT_HTTP_USE_SYSTEM_PROXY`: `false` ignores HTTP(S)_PROXY settings
//! - `MCREPORT_LOOKBACK_DAYS`: Send lookback window in days
//! - `MCREPORT_BATCH_SIZE`: Tracking event batch threshold
//!
//! ## File Locations
//! The loader checks the following paths (in order):
//! 1. `./mcreport.json` or `./mcreport.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use mcreport_domain::{Config, Credentials, HttpConfig, McReportError, ReportingConfig, Result};
use url::Url;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `McReportError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or the endpoint is not an http(s) URL
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Endpoint, username and password must be present; everything else falls
/// back to defaults.
///
/// # Errors
/// Returns `McReportError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let endpoint = env_var("MCREPORT_ENDPOINT")?;
    let username = env_var("MCREPORT_USERNAME")?;
    let password = env_var("MCREPORT_PASSWORD")?;

    let mut credentials = Credentials::new(endpoint, username, password);
    if let Some(client_id) = env_parse::<i64>("MCREPORT_CLIENT_ID", "client id")? {
        credentials = credentials.with_client_id(client_id);
    }

    let http_defaults = HttpConfig::default();
    let http = HttpConfig {
        timeout_secs: env_parse("MCREPORT_HTTP_TIMEOUT_SECS", "HTTP timeout")?
            .unwrap_or(http_defaults.timeout_secs),
        max_attempts: env_parse("MCREPORT_HTTP_MAX_ATTEMPTS", "HTTP max attempts")?
            .unwrap_or(http_defaults.max_attempts),
        base_backoff_ms: http_defaults.base_backoff_ms,
        use_system_proxy: env_parse("MCREPORT_HTTP_USE_SYSTEM_PROXY", "proxy flag")?
            .unwrap_or(http_defaults.use_system_proxy),
    };

    let reporting_defaults = ReportingConfig::default();
    let reporting = ReportingConfig {
        lookback_days: env_parse("MCREPORT_LOOKBACK_DAYS", "lookback days")?
            .unwrap_or(reporting_defaults.lookback_days),
        batch_size: env_parse("MCREPORT_BATCH_SIZE", "batch size")?
            .unwrap_or(reporting_defaults.batch_size),
    };

    let config = Config { marketing_cloud: credentials, http, reporting };
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, the standard locations are searched.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `McReportError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(McReportError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            McReportError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| McReportError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| McReportError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| McReportError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(McReportError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Reject credentials the transport could never use.
fn validate(config: &Config) -> Result<()> {
    let credentials = &config.marketing_cloud;

    let endpoint = Url::parse(credentials.endpoint()).map_err(|e| {
        McReportError::Config(format!("Invalid endpoint '{}': {}", credentials.endpoint(), e))
    })?;
    if !matches!(endpoint.scheme(), "http" | "https") {
        return Err(McReportError::Config(format!(
            "Endpoint must use http or https: {}",
            credentials.endpoint()
        )));
    }

    if credentials.username().trim().is_empty() {
        return Err(McReportError::Config("Username must not be empty".into()));
    }
    if credentials.password().is_empty() {
        return Err(McReportError::Config("Password must not be empty".into()));
    }

    Ok(())
}

/// First existing config file among the standard locations
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    const NAMES: [&str; 6] = [
        "mcreport.json",
        "mcreport.toml",
        "config.json",
        "config.toml",
        "../config.json",
        "../config.toml",
    ];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        McReportError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable; unset or blank yields `None`.
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| McReportError::Config(format!("Invalid {}: {}", what, e))),
        _ => Ok(None),
    }
}
