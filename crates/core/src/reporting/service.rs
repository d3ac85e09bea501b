//! Reporting service - sends and tracking events

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mcreport_domain::constants::{SEND_OBJECT_TYPE, SEND_PROPERTIES, TRACKING_EVENT_PROPERTIES};
use mcreport_domain::{
    ContinuationToken, EventType, FilterPart, McReportError, Page, PaginationCursor, Result,
    RetrieveRequest, SendRecord, SystemStatus, TrackingEvent,
};
use tracing::{debug, info, warn};

use crate::ports::RetrieveTransport;
use crate::retrieval::RetrievalService;

/// Reporting calls built on the retrieval engine.
pub struct ReportingService {
    retrieval: RetrievalService,
}

impl ReportingService {
    /// Create a reporting service over `transport`, scoping new queries to
    /// `client_id` when given.
    pub fn new(transport: Arc<dyn RetrieveTransport>, client_id: Option<i64>) -> Self {
        Self { retrieval: RetrievalService::new(transport).with_client_id(client_id) }
    }

    pub fn retrieval(&self) -> &RetrievalService {
        &self.retrieval
    }

    /// All sends whose send date falls between `start - lookback_days` and
    /// `end`.
    ///
    /// Uses the non-paginating path: a `MoreDataAvailable` answer fails with
    /// `Unsupported` rather than returning a partial list.
    pub async fn get_sends(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        lookback_days: u32,
    ) -> Result<Vec<SendRecord>> {
        validate_range(start, end)?;

        let from = Duration::try_days(i64::from(lookback_days))
            .and_then(|lookback| start.checked_sub_signed(lookback))
            .ok_or_else(|| {
                McReportError::InvalidInput(format!(
                    "lookback of {lookback_days} days before {start} is out of range"
                ))
            })?;
        let request = RetrieveRequest::new(SEND_OBJECT_TYPE, SEND_PROPERTIES.iter().copied())
            .with_filter(FilterPart::date_between("SendDate", from, end));

        let objects = self.retrieval.retrieve_all(request).await?;
        let sends =
            objects.iter().map(SendRecord::try_from).collect::<Result<Vec<SendRecord>>>()?;

        info!(count = sends.len(), %from, %end, "loaded sends");
        Ok(sends)
    }

    /// One batch of tracking events of `event_type` for a send.
    ///
    /// Without `continuation` a new query filtered on `SendID` and the
    /// `EventDate` range is issued; with it, paging resumes where the previous
    /// batch stopped and the date range is ignored.
    pub async fn load_tracking_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        send_id: &str,
        event_type: EventType,
        batch_size: usize,
        continuation: Option<&ContinuationToken>,
    ) -> Result<Page<TrackingEvent>> {
        let filter = match continuation {
            Some(_) => None,
            None => {
                validate_range(start, end)?;
                if send_id.trim().is_empty() {
                    return Err(McReportError::InvalidInput("send id is required".into()));
                }
                Some(
                    FilterPart::equals("SendID", send_id)
                        .and(FilterPart::date_between("EventDate", start, end)),
                )
            }
        };

        let page = self
            .retrieval
            .load_batch(
                event_type.object_type(),
                TRACKING_EVENT_PROPERTIES,
                filter,
                batch_size,
                continuation,
            )
            .await?;

        debug!(
            send_id,
            %event_type,
            events = page.len(),
            more_data = page.has_more_data(),
            "loaded tracking events"
        );

        page.try_map(|object| TrackingEvent::try_from(&object))
    }

    /// Tracking events for a send across several event types, walked in the
    /// given order.
    ///
    /// Returns the events plus a cursor when the batch filled before every
    /// type was drained; pass the cursor back to continue. Types recorded as
    /// processed in the cursor are skipped, and the cursor's current type is
    /// resumed from its token.
    pub async fn load_tracking_events_for_types(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        send_id: &str,
        event_types: &[EventType],
        batch_size: usize,
        cursor: Option<PaginationCursor>,
    ) -> Result<(Vec<TrackingEvent>, Option<PaginationCursor>)> {
        let mut cursor = cursor.unwrap_or_default();
        ensure_token_is_resumable(&cursor, event_types)?;
        let mut events = Vec::new();

        for &event_type in event_types {
            if cursor.is_processed(event_type) {
                continue;
            }

            if events.len() >= batch_size {
                cursor.current_event_type = None;
                cursor.next_page_id = None;
                return Ok((events, Some(cursor)));
            }

            let resume = cursor.token_for(event_type).cloned();
            let remaining = batch_size - events.len();
            let page = self
                .load_tracking_events(
                    start,
                    end,
                    send_id,
                    event_type,
                    remaining,
                    resume.as_ref(),
                )
                .await?;

            events.extend(page.records);

            match page.continuation {
                Some(token) => {
                    cursor.current_event_type = Some(event_type);
                    cursor.next_page_id = Some(token);
                    return Ok((events, Some(cursor)));
                }
                None => {
                    cursor.mark_processed(event_type);
                    cursor.current_event_type = None;
                    cursor.next_page_id = None;
                }
            }
        }

        Ok((events, None))
    }

    /// Query `GetSystemStatus`.
    ///
    /// An error overall status is raised as `ApiStatus`; a reachable system
    /// that reports maintenance is returned as-is.
    pub async fn check_system_status(&self) -> Result<SystemStatus> {
        let status = self.retrieval.transport().system_status().await?;

        if status.overall_status.is_error() {
            return Err(McReportError::api_status(
                status.overall_status.as_str(),
                status.status_message.as_str(),
                status.request_id.as_str(),
            ));
        }

        if !status.is_available() {
            warn!(
                system_status = status.system_status.as_deref().unwrap_or("unknown"),
                "Marketing Cloud reports degraded availability"
            );
        }

        Ok(status)
    }
}

/// A pending token must belong to an event type this walk will still visit.
fn ensure_token_is_resumable(cursor: &PaginationCursor, event_types: &[EventType]) -> Result<()> {
    let Some(token) = &cursor.next_page_id else {
        return Ok(());
    };

    match cursor.current_event_type {
        Some(current) if event_types.contains(&current) && !cursor.is_processed(current) => Ok(()),
        Some(current) => Err(McReportError::InvalidInput(format!(
            "cursor token {token} belongs to {current}, which is not pending in the requested event types"
        ))),
        None => Err(McReportError::InvalidInput(format!(
            "cursor token {token} has no current event type"
        ))),
    }
}

fn validate_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end < start {
        return Err(McReportError::InvalidInput(format!(
            "end date {end} is before start date {start}"
        )));
    }
    Ok(())
}
