//! Configuration management

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_BACKOFF_MS, DEFAULT_BATCH_SIZE, DEFAULT_LOOKBACK_DAYS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_TIMEOUT_SECS,
};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub marketing_cloud: Credentials,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
}

impl Config {
    /// Configuration with default HTTP and reporting settings.
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            marketing_cloud: credentials,
            http: HttpConfig::default(),
            reporting: ReportingConfig::default(),
        }
    }
}

/// Marketing Cloud SOAP credentials.
///
/// Immutable once built; the transport takes ownership of a copy.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    endpoint: String,
    username: String,
    #[serde(skip_serializing)]
    password: String,
    #[serde(default)]
    client_id: Option<i64>,
}

impl Credentials {
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            client_id: None,
        }
    }

    /// Attach the business unit (MID) every new query is scoped to.
    pub fn with_client_id(mut self, client_id: i64) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn client_id(&self) -> Option<i64> {
        self.client_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Total attempts per request (initial try + retries).
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
    /// Honour `HTTP(S)_PROXY` / `NO_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff_ms: DEFAULT_BASE_BACKOFF_MS,
            use_system_proxy: true,
        }
    }
}

/// Reporting defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportingConfig {
    /// How far before the report start date sends are still considered.
    pub lookback_days: u32,
    pub batch_size: usize,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self { lookback_days: DEFAULT_LOOKBACK_DAYS, batch_size: DEFAULT_BATCH_SIZE }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_password() {
        let creds = Credentials::new("https://example.test/Service.asmx", "api-user", "hunter2");
        let rendered = format!("{creds:?}");

        assert!(rendered.contains("api-user"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn password_is_never_serialized() {
        let creds = Credentials::new("https://example.test", "user", "secret").with_client_id(7);
        let json = serde_json::to_string(&creds).expect("serialize");

        assert!(!json.contains("secret"));
        assert!(json.contains("\"client_id\":7"));
    }

    #[test]
    fn sections_fall_back_to_defaults() {
        let json = r#"{
            "marketing_cloud": {
                "endpoint": "https://example.test",
                "username": "user",
                "password": "pw"
            }
        }"#;

        let config: Config = serde_json::from_str(json).expect("deserialize");
        assert_eq!(config.http, HttpConfig::default());
        assert_eq!(config.reporting.lookback_days, 30);
        assert_eq!(config.marketing_cloud.client_id(), None);
        assert_eq!(config.marketing_cloud.password(), "pw");
    }
}
