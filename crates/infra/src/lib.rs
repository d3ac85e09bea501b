//! # McReport Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The Marketing Cloud SOAP transport (envelopes, parsing, faults)
//! - HTTP client with retry and backoff
//! - Configuration loading (environment, JSON, TOML)
//! - Logging setup
//!
//! ## Architecture
//! - Implements traits defined in `mcreport-core`
//! - Depends on `mcreport-domain` and `mcreport-core`
//! - Contains all "impure" code (network I/O, files, environment)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, RetryPolicy};
pub use integrations::marketing_cloud::{SoapFault, SoapFaultCategory, SoapTransport};
pub use observability::{init_tracing, LogFormat};
