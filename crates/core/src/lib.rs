//! # McReport Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The transport port (`RetrieveTransport`)
//! - The paginated retrieval engine
//! - Typed reporting calls (sends, tracking events, system status)
//!
//! ## Architecture Principles
//! - Only depends on `mcreport-domain`
//! - No HTTP or XML code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod ports;
pub mod reporting;
pub mod retrieval;

#[cfg(test)]
mod testing;

pub use ports::RetrieveTransport;
pub use reporting::ReportingService;
pub use retrieval::RetrievalService;
