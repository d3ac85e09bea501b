//! # McReport Domain
//!
//! Business domain types and models for McReport.
//!
//! This crate contains:
//! - Retrieve request/response types and filter expressions
//! - Typed reporting records (sends, tracking events)
//! - Pagination types (pages, continuation tokens, cursors)
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other McReport crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
