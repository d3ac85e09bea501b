//! Conversions from external infrastructure errors into domain errors.

use mcreport_domain::McReportError;
use quick_xml::events::attributes::AttrError;
use quick_xml::Error as XmlError;
use reqwest::Error as HttpError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub McReportError);

impl From<InfraError> for McReportError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<McReportError> for InfraError {
    fn from(value: McReportError) -> Self {
        InfraError(value)
    }
}

trait IntoMcReportError {
    fn into_mcreport(self) -> McReportError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → McReportError */
/* -------------------------------------------------------------------------- */

impl IntoMcReportError for HttpError {
    fn into_mcreport(self) -> McReportError {
        if self.is_timeout() {
            return McReportError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return McReportError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => McReportError::Auth(message),
                429 => McReportError::Network(message),
                400..=499 => McReportError::InvalidInput(message),
                _ => McReportError::Network(message),
            };
        }

        if self.is_builder() {
            return McReportError::Config(format!("invalid HTTP request: {self}"));
        }

        McReportError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_mcreport())
    }
}

/* -------------------------------------------------------------------------- */
/* quick_xml errors → McReportError */
/* -------------------------------------------------------------------------- */

impl IntoMcReportError for XmlError {
    fn into_mcreport(self) -> McReportError {
        McReportError::Protocol(format!("malformed SOAP XML: {self}"))
    }
}

impl From<XmlError> for InfraError {
    fn from(value: XmlError) -> Self {
        InfraError(value.into_mcreport())
    }
}

impl From<AttrError> for InfraError {
    fn from(value: AttrError) -> Self {
        InfraError(McReportError::Protocol(format!("malformed SOAP XML attribute: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → McReportError */
/* -------------------------------------------------------------------------- */

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(McReportError::Config(format!("invalid endpoint URL: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
