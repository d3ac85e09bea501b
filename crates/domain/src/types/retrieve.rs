//! Retrieve request/response model
//!
//! The vendor's `OverallStatus` string is decoded exactly once, in
//! [`RetrieveStatus::parse`]; everything downstream matches on the enum.

use serde::{Deserialize, Serialize};

use super::filter::FilterPart;
use super::pagination::ContinuationToken;

/// What a retrieve call asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrieveQuery {
    /// A fresh query against one object type.
    New { object_type: String, properties: Vec<String>, filter: Option<FilterPart> },
    /// Next page of an earlier query. Object type, properties and filter are
    /// carried server-side.
    Continue(ContinuationToken),
}

/// A single `Retrieve` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveRequest {
    pub query: RetrieveQuery,
    pub client_ids: Vec<i64>,
}

impl RetrieveRequest {
    pub fn new<S: Into<String>>(
        object_type: impl Into<String>,
        properties: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            query: RetrieveQuery::New {
                object_type: object_type.into(),
                properties: properties.into_iter().map(Into::into).collect(),
                filter: None,
            },
            client_ids: Vec::new(),
        }
    }

    pub fn continuation(token: ContinuationToken) -> Self {
        Self { query: RetrieveQuery::Continue(token), client_ids: Vec::new() }
    }

    /// Attach a filter. Has no effect on continuation requests.
    pub fn with_filter(mut self, filter: FilterPart) -> Self {
        if let RetrieveQuery::New { filter: ref mut slot, .. } = self.query {
            *slot = Some(filter);
        }
        self
    }

    pub fn with_client_id(mut self, client_id: Option<i64>) -> Self {
        if let Some(id) = client_id {
            self.client_ids.push(id);
        }
        self
    }

    pub fn is_continuation(&self) -> bool {
        matches!(self.query, RetrieveQuery::Continue(_))
    }

    /// Object type of a new query; `None` for continuations.
    pub fn object_type(&self) -> Option<&str> {
        match &self.query {
            RetrieveQuery::New { object_type, .. } => Some(object_type),
            RetrieveQuery::Continue(_) => None,
        }
    }
}

/// Decoded `OverallStatus` of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrieveStatus {
    Ok,
    MoreDataAvailable,
    /// Any status beginning with "error" (case-insensitive); raw value kept.
    Error(String),
    /// Anything else. Terminal, no continuation.
    Other(String),
}

impl RetrieveStatus {
    /// Decode the vendor status string.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();

        if lower.starts_with("error") {
            Self::Error(raw.to_string())
        } else if lower == "moredataavailable" {
            Self::MoreDataAvailable
        } else if lower == "ok" {
            Self::Ok
        } else {
            Self::Other(raw.to_string())
        }
    }

    /// Status as it would appear on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "OK",
            Self::MoreDataAvailable => "MoreDataAvailable",
            Self::Error(raw) | Self::Other(raw) => raw,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// One object from the `Results` list: its `xsi:type` plus its properties in
/// document order. Nested elements are flattened with dotted paths
/// (`Client.ID`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiObject {
    pub object_type: String,
    pub properties: Vec<(String, String)>,
}

impl ApiObject {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self { object_type: object_type.into(), properties: Vec::new() }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    /// First value of `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Decoded `RetrieveResponseMsg`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub status: RetrieveStatus,
    pub status_message: String,
    pub request_id: String,
    pub results: Vec<ApiObject>,
}

impl RetrieveResponse {
    /// Token for the next page, present only on `MoreDataAvailable`.
    pub fn continuation(&self) -> Option<ContinuationToken> {
        match self.status {
            RetrieveStatus::MoreDataAvailable if !self.request_id.is_empty() => {
                Some(ContinuationToken::new(self.request_id.clone()))
            }
            _ => None,
        }
    }
}

/// Decoded `GetSystemStatusResponseMsg`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub overall_status: RetrieveStatus,
    pub status_message: String,
    pub request_id: String,
    /// `OK`, `InMaintenance` or `UnplannedOutage` when reported.
    pub system_status: Option<String>,
}

impl SystemStatus {
    pub fn is_available(&self) -> bool {
        self.system_status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("ok"))
    }
}
