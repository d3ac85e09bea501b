use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mcreport_core::RetrieveTransport;
use mcreport_domain::{
    ApiObject, Result as DomainResult, RetrieveQuery, RetrieveRequest, RetrieveResponse,
    RetrieveStatus, SystemStatus,
};

/// In-memory stand-in for the vendor paging contract.
///
/// A new query returns page 0; `Continue("req-N")` returns page N + 1. Every
/// page but the last answers `MoreDataAvailable`. Object ids run
/// sequentially across pages so ordering and gaps are easy to assert.
pub struct MockPagedService {
    page_sizes: Vec<usize>,
    calls: AtomicUsize,
}

impl MockPagedService {
    /// Create a service that serves pages of the given sizes.
    pub fn new(page_sizes: Vec<usize>) -> Self {
        Self { page_sizes, calls: AtomicUsize::new(0) }
    }

    /// Number of retrieve calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Total number of objects across all pages.
    pub fn total(&self) -> usize {
        self.page_sizes.iter().sum()
    }

    fn page(&self, index: usize) -> RetrieveResponse {
        let first_id: usize = self.page_sizes[..index].iter().sum();
        let results = (first_id..first_id + self.page_sizes[index])
            .map(|id| ApiObject::new("Send").with_property("ID", id.to_string()))
            .collect();
        let status = if index + 1 < self.page_sizes.len() {
            RetrieveStatus::MoreDataAvailable
        } else {
            RetrieveStatus::Ok
        };

        RetrieveResponse {
            status,
            status_message: String::new(),
            request_id: format!("req-{index}"),
            results,
        }
    }
}

#[async_trait]
impl RetrieveTransport for MockPagedService {
    async fn retrieve(&self, request: &RetrieveRequest) -> DomainResult<RetrieveResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let index = match &request.query {
            RetrieveQuery::New { .. } => Some(0),
            RetrieveQuery::Continue(token) => token
                .as_str()
                .strip_prefix("req-")
                .and_then(|n| n.parse::<usize>().ok())
                .map(|n| n + 1)
                .filter(|next| *next < self.page_sizes.len()),
        };

        Ok(match index {
            Some(index) => self.page(index),
            None => RetrieveResponse {
                status: RetrieveStatus::parse("Error: invalid continue request"),
                status_message: String::new(),
                request_id: "req-invalid".into(),
                results: vec![],
            },
        })
    }

    async fn system_status(&self) -> DomainResult<SystemStatus> {
        Ok(SystemStatus {
            overall_status: RetrieveStatus::Ok,
            status_message: String::new(),
            request_id: "status".into(),
            system_status: Some("OK".into()),
        })
    }
}

/// Object ids of a page, in order.
pub fn ids(objects: &[ApiObject]) -> Vec<usize> {
    objects.iter().filter_map(|o| o.get("ID")).filter_map(|id| id.parse().ok()).collect()
}
