//! HTTP plumbing shared by the SOAP integration.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder, RetryPolicy};
