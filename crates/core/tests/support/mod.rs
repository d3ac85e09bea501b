//! Shared test helpers for `mcreport-core` integration tests.
//!
//! These helpers provide an in-memory paged service so pagination tests can
//! focus on behaviour instead of boilerplate.

pub mod paged_service;
