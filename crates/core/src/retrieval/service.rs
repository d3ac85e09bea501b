//! Paginated retrieval engine

use std::sync::Arc;

use mcreport_domain::{
    ApiObject, ContinuationToken, FilterPart, McReportError, Page, Result, RetrieveRequest,
    RetrieveResponse, RetrieveStatus,
};
use tracing::{debug, info};

use crate::ports::RetrieveTransport;

/// Issues retrieve calls, classifies their status and drives continuation
/// paging.
///
/// Paging is strictly sequential: every continuation depends on the request
/// id of the previous response.
#[derive(Clone)]
pub struct RetrievalService {
    transport: Arc<dyn RetrieveTransport>,
    client_id: Option<i64>,
}

impl RetrievalService {
    pub fn new(transport: Arc<dyn RetrieveTransport>) -> Self {
        Self { transport, client_id: None }
    }

    /// Scope every request to a business unit (MID).
    pub fn with_client_id(mut self, client_id: Option<i64>) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn transport(&self) -> &Arc<dyn RetrieveTransport> {
        &self.transport
    }

    /// Fetch a single page.
    ///
    /// Either starts a new query (`object_type`, `properties`, optional
    /// `filter`) or continues an earlier one from `continuation`. Supplying
    /// both a filter and a continuation is rejected.
    ///
    /// # Errors
    /// - `InvalidInput` for conflicting or missing arguments
    /// - `ApiStatus` when the service reports an error status
    /// - any transport error unchanged
    pub async fn retrieve(
        &self,
        object_type: &str,
        properties: &[&str],
        filter: Option<FilterPart>,
        continuation: Option<&ContinuationToken>,
    ) -> Result<Page<ApiObject>> {
        let request = self.build_request(object_type, properties, filter, continuation)?;
        let response = self.execute(&request).await?;
        let next = response.continuation();

        debug!(
            object_type,
            records = response.results.len(),
            continued = continuation.is_some(),
            more_data = next.is_some(),
            "retrieved page"
        );

        Ok(Page::new(response.results, next))
    }

    /// Non-paginating retrieve.
    ///
    /// Fails fast with `Unsupported` when the service answers
    /// `MoreDataAvailable`, instead of returning a truncated result.
    pub async fn retrieve_all(&self, request: RetrieveRequest) -> Result<Vec<ApiObject>> {
        let request = request.with_client_id(self.client_id);
        let response = self.execute(&request).await?;

        if response.status == RetrieveStatus::MoreDataAvailable {
            return Err(McReportError::Unsupported(format!(
                "{} returned MoreDataAvailable (requestId {}); use a paginating retrieve",
                request.object_type().unwrap_or("continuation"),
                response.request_id
            )));
        }

        Ok(response.results)
    }

    /// Fetch pages until drained or until `batch_size` records have been
    /// accumulated while more data is still pending.
    ///
    /// The first page is always consumed whole and the threshold is only
    /// checked after a continuation page, so a resumable token is returned
    /// with whole pages only. When the batch fills, the pending token is
    /// returned in the page instead of being discarded.
    ///
    /// Any failure, including one on a continuation page, is returned as an
    /// error; already accumulated records are not returned alongside it.
    pub async fn load_batch(
        &self,
        object_type: &str,
        properties: &[&str],
        filter: Option<FilterPart>,
        batch_size: usize,
        continuation: Option<&ContinuationToken>,
    ) -> Result<Page<ApiObject>> {
        let first = self.retrieve(object_type, properties, filter, continuation).await?;
        let mut records = first.records;
        let mut next = first.continuation;
        let mut pages = 1usize;

        while let Some(token) = next.take() {
            let page = self.retrieve(object_type, properties, None, Some(&token)).await?;
            pages += 1;
            records.extend(page.records);
            next = page.continuation;

            if records.len() >= batch_size && next.is_some() {
                info!(
                    object_type,
                    pages,
                    records = records.len(),
                    batch_size,
                    "batch filled; returning resumable cursor"
                );
                return Ok(Page::new(records, next));
            }
        }

        info!(object_type, pages, records = records.len(), "retrieval drained");
        Ok(Page::last(records))
    }

    fn build_request(
        &self,
        object_type: &str,
        properties: &[&str],
        filter: Option<FilterPart>,
        continuation: Option<&ContinuationToken>,
    ) -> Result<RetrieveRequest> {
        let request = match (continuation, filter) {
            (Some(_), Some(_)) => {
                return Err(McReportError::InvalidInput(
                    "filter and continuation token are mutually exclusive".into(),
                ));
            }
            (Some(token), None) => RetrieveRequest::continuation(token.clone()),
            (None, filter) => {
                if object_type.trim().is_empty() {
                    return Err(McReportError::InvalidInput(
                        "object type is required for a new retrieve".into(),
                    ));
                }
                if properties.is_empty() {
                    return Err(McReportError::InvalidInput(
                        "at least one property is required for a new retrieve".into(),
                    ));
                }
                let request = RetrieveRequest::new(object_type, properties.iter().copied());
                match filter {
                    Some(filter) => request.with_filter(filter),
                    None => request,
                }
            }
        };

        Ok(request.with_client_id(self.client_id))
    }

    /// Send the request and surface error statuses as `ApiStatus`.
    async fn execute(&self, request: &RetrieveRequest) -> Result<RetrieveResponse> {
        let response = self.transport.retrieve(request).await?;

        if let RetrieveStatus::Error(status) = &response.status {
            return Err(McReportError::api_status(
                status.as_str(),
                response.status_message.as_str(),
                response.request_id.as_str(),
            ));
        }

        Ok(response)
    }
}
