//! Domain types and models
//!
//! Request/response shapes of the Marketing Cloud `Retrieve` contract and the
//! typed reporting records built on top of them.

pub mod filter;
pub mod pagination;
pub mod records;
pub mod retrieve;

pub use filter::{FilterPart, FilterValue, LogicalOperator, SimpleOperator};
pub use pagination::{ContinuationToken, Page, PaginationCursor};
pub use records::{parse_vendor_datetime, EventType, SendRecord, TrackingEvent};
pub use retrieve::{
    ApiObject, RetrieveQuery, RetrieveRequest, RetrieveResponse, RetrieveStatus, SystemStatus,
};
