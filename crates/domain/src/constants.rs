//! Application constants
//!
//! Vendor namespaces, object type names and reporting defaults.

// SOAP / WS-Security namespaces
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const PARTNER_API_NS: &str = "http://exacttarget.com/wsdl/partnerAPI";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
pub const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
pub const PASSWORD_TEXT_TYPE: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText";

// Object types
pub const SEND_OBJECT_TYPE: &str = "Send";

// Property lists requested by the reporting calls
pub const SEND_PROPERTIES: &[&str] = &["ID", "Additional", "SendDate", "SentDate", "EmailName"];
pub const TRACKING_EVENT_PROPERTIES: &[&str] =
    &["SendID", "EventDate", "EventType", "SubscriberKey"];

// Reporting defaults
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;
pub const DEFAULT_BATCH_SIZE: usize = 2500;

// HTTP defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 200;
