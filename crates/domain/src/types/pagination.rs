//! Pagination types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::records::EventType;

/// Opaque vendor request id used to fetch the next page of a retrieve.
///
/// Only valid for the object type and filter of the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self(request_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Records of one or more pages plus the token to resume from, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub continuation: Option<ContinuationToken>,
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, continuation: Option<ContinuationToken>) -> Self {
        Self { records, continuation }
    }

    /// Fully drained page with no continuation.
    pub fn last(records: Vec<T>) -> Self {
        Self { records, continuation: None }
    }

    pub fn has_more_data(&self) -> bool {
        self.continuation.is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Convert every record, keeping the continuation.
    pub fn try_map<U, E, F>(self, f: F) -> Result<Page<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        let records = self.records.into_iter().map(f).collect::<Result<Vec<_>, E>>()?;
        Ok(Page { records, continuation: self.continuation })
    }
}

/// Resume point when paging sequentially across several event types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    /// Continuation token for `current_event_type`.
    pub next_page_id: Option<ContinuationToken>,
    pub current_event_type: Option<EventType>,
    pub processed_event_types: Vec<EventType>,
}

impl PaginationCursor {
    pub fn is_processed(&self, event_type: EventType) -> bool {
        self.processed_event_types.contains(&event_type)
    }

    pub fn mark_processed(&mut self, event_type: EventType) {
        if !self.is_processed(event_type) {
            self.processed_event_types.push(event_type);
        }
    }

    /// Token to resume `event_type` with, if this cursor stopped inside it.
    pub fn token_for(&self, event_type: EventType) -> Option<&ContinuationToken> {
        if self.current_event_type == Some(event_type) {
            self.next_page_id.as_ref()
        } else {
            None
        }
    }
}
