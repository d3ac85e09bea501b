//! Port interfaces for the Marketing Cloud SOAP service

use async_trait::async_trait;
use mcreport_domain::{RetrieveRequest, RetrieveResponse, Result, SystemStatus};

/// Authenticated transport to the vendor SOAP endpoint.
///
/// Implementations attach credentials to every call and decode the response
/// envelope, including the overall status, before returning. They do not
/// interpret the status: an `Error` status is a successful transport call.
#[async_trait]
pub trait RetrieveTransport: Send + Sync {
    /// Issue one `Retrieve` call.
    async fn retrieve(&self, request: &RetrieveRequest) -> Result<RetrieveResponse>;

    /// Issue one `GetSystemStatus` call.
    async fn system_status(&self) -> Result<SystemStatus>;
}
