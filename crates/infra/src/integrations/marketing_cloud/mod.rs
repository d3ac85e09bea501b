//! Marketing Cloud SOAP integration
//!
//! # Architecture
//!
//! - **Transport**: `SoapTransport` - lazily connected client implementing
//!   `mcreport_core::RetrieveTransport`
//! - **Envelope**: SOAP 1.1 request rendering with a WS-Security
//!   `UsernameToken` header
//! - **Parser**: response decoding into domain retrieve types
//! - **Errors**: SOAP fault classification and domain error mapping
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use mcreport_core::ReportingService;
//! use mcreport_domain::{Credentials, HttpConfig};
//! use mcreport_infra::integrations::marketing_cloud::SoapTransport;
//!
//! # async fn example() -> mcreport_domain::Result<()> {
//! let credentials = Credentials::new(
//!     "https://webservice.s7.exacttarget.com/Service.asmx",
//!     "api-user",
//!     "secret",
//! );
//! let transport = Arc::new(SoapTransport::new(credentials, HttpConfig::default())?);
//! let reporting = ReportingService::new(transport, None);
//!
//! let status = reporting.check_system_status().await?;
//! println!("available: {}", status.is_available());
//! # Ok(())
//! # }
//! ```

pub mod envelope;
pub mod errors;
pub mod parser;
pub mod transport;

pub use errors::{SoapFault, SoapFaultCategory};
pub use transport::SoapTransport;
