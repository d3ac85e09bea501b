//! SOAP fault classification
//!
//! Faults and non-success HTTP statuses coming back from the SOAP endpoint are
//! categorised here and converted into [`McReportError`] at the module
//! boundary.

use std::fmt;

use mcreport_domain::McReportError;
use reqwest::StatusCode;

/// Category of a failed SOAP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoapFaultCategory {
    /// Credentials rejected (security fault, 401, 403)
    Authentication,

    /// Endpoint temporarily unavailable (429, 5xx without a SOAP body)
    ServerUnavailable,

    /// Request rejected as malformed (client fault, other 4xx)
    Validation,

    /// Unknown or unclassified fault
    Unknown,
}

impl SoapFaultCategory {
    /// Classify a SOAP fault from its `faultcode` and `faultstring`.
    pub fn classify(code: &str, message: &str) -> Self {
        let code = code.to_ascii_lowercase();
        let message = message.to_ascii_lowercase();

        if message.contains("login failed")
            || message.contains("unauthorized")
            || code.contains("security")
            || code.contains("failedauthentication")
        {
            return Self::Authentication;
        }

        if message.contains("unavailable") || message.contains("timed out") {
            return Self::ServerUnavailable;
        }

        if code.ends_with("client") {
            return Self::Validation;
        }

        Self::Unknown
    }

    /// Classify a non-success HTTP status that did not carry a SOAP fault.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Authentication,
            429 | 500..=599 => Self::ServerUnavailable,
            400..=499 => Self::Validation,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for SoapFaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "Authentication Failed"),
            Self::ServerUnavailable => write!(f, "Server Unavailable"),
            Self::Validation => write!(f, "Validation Error"),
            Self::Unknown => write!(f, "Unknown Fault"),
        }
    }
}

/// A failed SOAP exchange with its classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{category}: {message}")]
pub struct SoapFault {
    category: SoapFaultCategory,
    code: String,
    message: String,
}

impl SoapFault {
    /// Build a fault from the `faultcode` / `faultstring` pair of a SOAP body.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let message = message.into();
        let category = SoapFaultCategory::classify(&code, &message);
        Self { category, code, message }
    }

    /// Build a fault for an HTTP error status without a SOAP fault body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let reason = status.canonical_reason().unwrap_or("unknown status");
        let snippet: String = body.trim().chars().take(200).collect();
        let message = if snippet.is_empty() {
            format!("HTTP {} {}", status.as_u16(), reason)
        } else {
            format!("HTTP {} {}: {}", status.as_u16(), reason, snippet)
        };

        Self {
            category: SoapFaultCategory::from_status(status),
            code: status.as_u16().to_string(),
            message,
        }
    }

    pub fn category(&self) -> SoapFaultCategory {
        self.category
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Convert into the domain error.
    pub fn into_domain_error(self) -> McReportError {
        match self.category {
            SoapFaultCategory::Authentication => McReportError::Auth(self.message),
            SoapFaultCategory::ServerUnavailable => McReportError::Network(self.message),
            SoapFaultCategory::Validation => {
                McReportError::InvalidInput(format!("{}: {}", self.code, self.message))
            }
            SoapFaultCategory::Unknown => {
                McReportError::Protocol(format!("SOAP fault {}: {}", self.code, self.message))
            }
        }
    }
}

impl From<SoapFault> for McReportError {
    fn from(fault: SoapFault) -> Self {
        fault.into_domain_error()
    }
}
