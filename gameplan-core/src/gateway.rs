//! The seam between the engine and a remote calendar provider.
//!
//! Providers implement [`CalendarGateway`]; the engine only ever talks to
//! this trait, which keeps it testable against an in-memory fake.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GameplanResult;
use crate::event::Event;

/// One mutation of a remote calendar.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOperation {
    Create {
        calendar_id: String,
        event: Event,
    },
    Update {
        calendar_id: String,
        event_id: String,
        event: Event,
    },
    Delete {
        calendar_id: String,
        event_id: String,
    },
}

impl EventOperation {
    pub fn calendar_id(&self) -> &str {
        match self {
            EventOperation::Create { calendar_id, .. }
            | EventOperation::Update { calendar_id, .. }
            | EventOperation::Delete { calendar_id, .. } => calendar_id,
        }
    }
}

impl fmt::Display for EventOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventOperation::Create { calendar_id, event } => {
                write!(f, "create '{event}' in {calendar_id}")
            }
            EventOperation::Update {
                calendar_id,
                event_id,
                ..
            } => write!(f, "update {event_id} in {calendar_id}"),
            EventOperation::Delete {
                calendar_id,
                event_id,
            } => write!(f, "delete {event_id} from {calendar_id}"),
        }
    }
}

/// An operation tagged with a caller-chosen correlation token.
///
/// Tokens must be unique within one [`CalendarGateway::apply_batch`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub token: String,
    pub operation: EventOperation,
}

/// Result of a single operation inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// The provider acknowledged the operation. Deletes carry no event.
    Success(Option<Event>),
    Failure(String),
}

/// A calendar as listed by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCalendar {
    pub id: String,
    pub name: String,
    pub primary: bool,
}

#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Create a calendar and return its remote id.
    async fn create_calendar(&self, name: &str, time_zone: &str) -> GameplanResult<String>;

    /// Events of a calendar expanded to single occurrences, ordered by start.
    /// An empty calendar yields an empty vector, not an error.
    async fn list_events(&self, calendar_id: &str, max_results: usize)
    -> GameplanResult<Vec<Event>>;

    /// Apply one operation. Returns the remote event for creates and updates.
    async fn apply_single(&self, operation: &EventOperation) -> GameplanResult<Option<Event>>;

    /// Submit many operations in one exchange.
    ///
    /// Outcomes are independent of each other and keyed by the request
    /// token. `Err` means the exchange itself failed and every contained
    /// operation is indeterminate.
    async fn apply_batch(
        &self,
        requests: &[BatchRequest],
    ) -> GameplanResult<HashMap<String, BatchOutcome>>;

    /// Grant read access on a calendar to `principal` (an e-mail address).
    async fn share_calendar(&self, calendar_id: &str, principal: &str) -> GameplanResult<()>;

    async fn list_calendars(&self) -> GameplanResult<Vec<RemoteCalendar>>;

    async fn delete_calendar(&self, calendar_id: &str) -> GameplanResult<()>;
}
