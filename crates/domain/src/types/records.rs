//! Typed reporting records decoded from retrieved API objects

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::retrieve::ApiObject;
use crate::{impl_vendor_enum_conversions, McReportError, Result};

/// Tracking event categories, each backed by its own vendor object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Sent,
    Open,
    Click,
    Bounce,
    Unsubscribe,
    NotSent,
    ForwardedEmail,
    Survey,
}

impl_vendor_enum_conversions!(EventType {
    Sent => "SentEvent",
    Open => "OpenEvent",
    Click => "ClickEvent",
    Bounce => "BounceEvent",
    Unsubscribe => "UnsubEvent",
    NotSent => "NotSentEvent",
    ForwardedEmail => "ForwardedEmailEvent",
    Survey => "SurveyEvent",
});

impl EventType {
    pub const ALL: [EventType; 8] = [
        Self::Sent,
        Self::Open,
        Self::Click,
        Self::Bounce,
        Self::Unsubscribe,
        Self::NotSent,
        Self::ForwardedEmail,
        Self::Survey,
    ];

    /// Vendor object type name used as the retrieve `ObjectType`.
    pub fn object_type(&self) -> &'static str {
        self.as_str()
    }
}

/// One email send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRecord {
    pub id: String,
    pub additional: Option<String>,
    pub send_date: Option<DateTime<Utc>>,
    pub sent_date: Option<DateTime<Utc>>,
    pub email_name: Option<String>,
}

impl TryFrom<&ApiObject> for SendRecord {
    type Error = McReportError;

    fn try_from(object: &ApiObject) -> Result<Self> {
        Ok(Self {
            id: required(object, "ID")?.to_string(),
            additional: optional(object, "Additional").map(str::to_string),
            send_date: optional(object, "SendDate").map(parse_vendor_datetime).transpose()?,
            sent_date: optional(object, "SentDate").map(parse_vendor_datetime).transpose()?,
            email_name: optional(object, "EmailName").map(str::to_string),
        })
    }
}

/// One tracking event (open, click, bounce, ...) for a send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub send_id: String,
    pub event_date: DateTime<Utc>,
    /// Vendor event type value (`Open`, `Click`, `HardBounce`, ...).
    pub event_type: String,
    pub subscriber_key: Option<String>,
}

impl TryFrom<&ApiObject> for TrackingEvent {
    type Error = McReportError;

    fn try_from(object: &ApiObject) -> Result<Self> {
        let event_type = optional(object, "EventType")
            .map_or_else(|| object.object_type.clone(), str::to_string);

        Ok(Self {
            send_id: required(object, "SendID")?.to_string(),
            event_date: parse_vendor_datetime(required(object, "EventDate")?)?,
            event_type,
            subscriber_key: optional(object, "SubscriberKey").map(str::to_string),
        })
    }
}

/// Parse a vendor `xsd:dateTime`.
///
/// Values with an offset are converted to UTC; values without one are taken
/// as UTC.
pub fn parse_vendor_datetime(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| McReportError::Protocol(format!("Invalid dateTime '{raw}': {e}")))
}

fn optional<'a>(object: &'a ApiObject, name: &str) -> Option<&'a str> {
    object.get(name).map(str::trim).filter(|value| !value.is_empty())
}

fn required<'a>(object: &'a ApiObject, name: &str) -> Result<&'a str> {
    optional(object, name).ok_or_else(|| {
        McReportError::Protocol(format!("{} object is missing {}", object.object_type, name))
    })
}
