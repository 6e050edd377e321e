#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use gameplan_core::calendar::Calendar;
use gameplan_core::gateway::{
    BatchOutcome, BatchRequest, CalendarGateway, EventOperation, RemoteCalendar,
};
use gameplan_core::ingest::RawGame;
use gameplan_core::store::Store;
use gameplan_core::sync::EventSettings;
use gameplan_core::{Event, EventTime, GameId, GameplanError, GameplanResult};
use tempfile::TempDir;

pub const CLUB_CAL: &str = "club-cal-1";
pub const LEAGUE_CAL: &str = "calA";

#[derive(Default)]
struct FakeState {
    calendars: HashMap<String, HashMap<String, Event>>,
    calendar_names: HashMap<String, String>,
    next_id: usize,
    operations: Vec<EventOperation>,
    batch_sizes: Vec<usize>,
    shared: Vec<(String, String)>,
}

/// In-memory calendar provider that records every operation it sees.
#[derive(Default)]
pub struct FakeGateway {
    pub(crate) state: Mutex<FakeState>,
    /// Creates whose summary contains one of these fail.
    pub fail_summaries: Vec<String>,
    /// Every batch call fails as a whole.
    pub fail_batches: bool,
    pub fail_calendar_creation: bool,
    /// Deletes from these calendars fail.
    pub fail_deletes_in: Vec<String>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_event(&self, calendar_id: &str, event: Event) {
        let mut state = self.state.lock().unwrap();
        state
            .calendars
            .entry(calendar_id.to_string())
            .or_default()
            .insert(event.id.clone(), event);
    }

    pub fn events(&self, calendar_id: &str) -> Vec<Event> {
        let state = self.state.lock().unwrap();
        state
            .calendars
            .get(calendar_id)
            .map(|events| events.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn event(&self, calendar_id: &str, event_id: &str) -> Option<Event> {
        let state = self.state.lock().unwrap();
        state.calendars.get(calendar_id)?.get(event_id).cloned()
    }

    pub fn operations(&self) -> Vec<EventOperation> {
        self.state.lock().unwrap().operations.clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().batch_sizes.clone()
    }

    pub fn calendar_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .state
            .lock()
            .unwrap()
            .calendar_names
            .values()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn clear_operations(&self) {
        let mut state = self.state.lock().unwrap();
        state.operations.clear();
        state.batch_sizes.clear();
    }

    fn apply(&self, operation: &EventOperation) -> GameplanResult<Option<Event>> {
        let mut state = self.state.lock().unwrap();
        state.operations.push(operation.clone());

        match operation {
            EventOperation::Create { calendar_id, event } => {
                if self
                    .fail_summaries
                    .iter()
                    .any(|s| event.summary.contains(s.as_str()))
                {
                    return Err(GameplanError::Transport("connection reset".into()));
                }
                state.next_id += 1;
                let mut created = event.clone();
                created.id = format!("ev-{}", state.next_id);
                state
                    .calendars
                    .entry(calendar_id.clone())
                    .or_default()
                    .insert(created.id.clone(), created.clone());
                Ok(Some(created))
            }
            EventOperation::Update {
                calendar_id,
                event_id,
                event,
            } => {
                let events = state.calendars.entry(calendar_id.clone()).or_default();
                if !events.contains_key(event_id) {
                    return Err(GameplanError::Provider("404 Not Found".into()));
                }
                let mut updated = event.clone();
                updated.id = event_id.clone();
                events.insert(event_id.clone(), updated.clone());
                Ok(Some(updated))
            }
            EventOperation::Delete {
                calendar_id,
                event_id,
            } => {
                if self.fail_deletes_in.contains(calendar_id) {
                    return Err(GameplanError::Transport("connection reset".into()));
                }
                if let Some(events) = state.calendars.get_mut(calendar_id) {
                    events.remove(event_id);
                }
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl CalendarGateway for FakeGateway {
    async fn create_calendar(&self, name: &str, _time_zone: &str) -> GameplanResult<String> {
        if self.fail_calendar_creation {
            return Err(GameplanError::Transport("unavailable".into()));
        }
        let mut state = self.state.lock().unwrap();
        let id = format!("cal-{}", state.calendar_names.len() + 1);
        state.calendar_names.insert(id.clone(), name.to_string());
        Ok(id)
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        max_results: usize,
    ) -> GameplanResult<Vec<Event>> {
        let mut events = self.events(calendar_id);
        events.sort_by_key(|e| e.start.instant());
        events.truncate(max_results);
        Ok(events)
    }

    async fn apply_single(&self, operation: &EventOperation) -> GameplanResult<Option<Event>> {
        self.apply(operation)
    }

    async fn apply_batch(
        &self,
        requests: &[BatchRequest],
    ) -> GameplanResult<HashMap<String, BatchOutcome>> {
        self.state.lock().unwrap().batch_sizes.push(requests.len());

        if self.fail_batches {
            return Err(GameplanError::Transport("batch endpoint unavailable".into()));
        }

        Ok(requests
            .iter()
            .map(|request| {
                let outcome = match self.apply(&request.operation) {
                    Ok(event) => BatchOutcome::Success(event),
                    Err(e) => BatchOutcome::Failure(e.to_string()),
                };
                (request.token.clone(), outcome)
            })
            .collect())
    }

    async fn share_calendar(&self, calendar_id: &str, principal: &str) -> GameplanResult<()> {
        self.state
            .lock()
            .unwrap()
            .shared
            .push((calendar_id.to_string(), principal.to_string()));
        Ok(())
    }

    async fn list_calendars(&self) -> GameplanResult<Vec<RemoteCalendar>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .calendar_names
            .iter()
            .map(|(id, name)| RemoteCalendar {
                id: id.clone(),
                name: name.clone(),
                primary: false,
            })
            .collect())
    }

    async fn delete_calendar(&self, calendar_id: &str) -> GameplanResult<()> {
        self.state.lock().unwrap().calendar_names.remove(calendar_id);
        Ok(())
    }
}

pub fn settings() -> EventSettings {
    EventSettings {
        time_zone: chrono_tz::Europe::Zurich,
        duration_hours: 2,
        reminder_minutes: 120,
        max_results: 500,
    }
}

pub fn date(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

/// Store with the club calendar and league "A" registered.
pub fn registered_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("games.db")).unwrap();
    store.insert_calendar_if_absent(&Calendar::club(CLUB_CAL)).unwrap();
    store
        .insert_calendar_if_absent(&Calendar::for_league("A", LEAGUE_CAL))
        .unwrap();
    (dir, store)
}

pub fn raw_game(id: &str, date: Option<&str>, gym: &str) -> RawGame {
    RawGame {
        id: GameId::from(id),
        date: date.map(self::date),
        day: String::new(),
        league: "A".into(),
        home_team: format!("Home {id}"),
        away_team: "Lions".into(),
        gym: gym.into(),
        result: String::new(),
    }
}

pub fn remote_event(id: &str, start: &str, location: &str) -> Event {
    let start = date(start);
    Event {
        id: id.into(),
        summary: "A Home g1 vs. Lions".into(),
        location: Some(location.into()),
        start: EventTime::DateTime(start),
        end: EventTime::DateTime(start + chrono::Duration::hours(2)),
        time_zone: Some("Europe/Zurich".into()),
        reminders: Vec::new(),
    }
}
