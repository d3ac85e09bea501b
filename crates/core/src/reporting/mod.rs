//! Typed reporting calls: sends, tracking events and system status

pub mod service;

pub use service::ReportingService;
