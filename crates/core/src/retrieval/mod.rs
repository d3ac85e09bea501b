//! Paginated retrieval against the `Retrieve` operation

pub mod service;

pub use service::RetrievalService;
