//! Scripted transport for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use mcreport_domain::{
    ApiObject, McReportError, Result, RetrieveRequest, RetrieveResponse, RetrieveStatus,
    SystemStatus,
};

use crate::ports::RetrieveTransport;

/// Replays queued responses in order and records every request it receives.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RetrieveResponse>>>,
    requests: Mutex<Vec<RetrieveRequest>>,
    system_status: Mutex<Option<SystemStatus>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(self, response: Result<RetrieveResponse>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Queue a page of `count` objects numbered from `first_id`.
    pub fn page(self, status: &str, request_id: &str, first_id: usize, count: usize) -> Self {
        self.push(Ok(response(status, request_id, numbered(first_id, count))))
    }

    pub fn with_system_status(self, status: SystemStatus) -> Self {
        *self.system_status.lock().unwrap() = Some(status);
        self
    }

    pub fn requests(&self) -> Vec<RetrieveRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RetrieveTransport for ScriptedTransport {
    async fn retrieve(&self, request: &RetrieveRequest) -> Result<RetrieveResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(McReportError::Internal("no scripted response left".into())))
    }

    async fn system_status(&self) -> Result<SystemStatus> {
        self.system_status
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| McReportError::Internal("no scripted system status".into()))
    }
}

pub fn response(status: &str, request_id: &str, results: Vec<ApiObject>) -> RetrieveResponse {
    RetrieveResponse {
        status: RetrieveStatus::parse(status),
        status_message: String::new(),
        request_id: request_id.to_string(),
        results,
    }
}

pub fn numbered(first_id: usize, count: usize) -> Vec<ApiObject> {
    (first_id..first_id + count)
        .map(|id| ApiObject::new("Send").with_property("ID", id.to_string()))
        .collect()
}

pub fn ids(objects: &[ApiObject]) -> Vec<String> {
    objects.iter().filter_map(|o| o.get("ID")).map(str::to_string).collect()
}
