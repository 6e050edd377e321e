//! Conversion between gameplan events and Google API events.

use anyhow::{Result, bail};
use chrono::Utc;
use gameplan_core::{Event, EventTime, Reminder};
use google_calendar::types::{EventDateTime, EventReminder, Reminders};

pub fn to_google(event: &Event) -> google_calendar::types::Event {
    let time_zone = event.time_zone.clone().unwrap_or_default();

    let reminders = Some(Reminders {
        overrides: event
            .reminders
            .iter()
            .map(|r| EventReminder {
                method: "popup".to_string(),
                minutes: r.minutes,
            })
            .collect(),
        use_default: event.reminders.is_empty(),
    });

    google_calendar::types::Event {
        id: event.id.clone(),
        summary: event.summary.clone(),
        location: event.location.clone().unwrap_or_default(),
        start: Some(event_time_to_google(&event.start, &time_zone)),
        end: Some(event_time_to_google(&event.end, &time_zone)),
        reminders,
        ..Default::default()
    }
}

fn event_time_to_google(time: &EventTime, time_zone: &str) -> EventDateTime {
    match time {
        EventTime::Date(d) => EventDateTime {
            date: Some(*d),
            date_time: None,
            time_zone: String::new(),
        },
        EventTime::DateTime(dt) => EventDateTime {
            date: None,
            date_time: Some(dt.with_timezone(&Utc)),
            time_zone: time_zone.to_string(),
        },
    }
}

pub fn from_google(event: google_calendar::types::Event) -> Result<Event> {
    let Some(start) = event.start.as_ref().and_then(event_time_from_google) else {
        bail!("Event {} has no start time", event.id);
    };
    let Some(end) = event.end.as_ref().and_then(event_time_from_google) else {
        bail!("Event {} has no end time", event.id);
    };

    let time_zone = event
        .start
        .as_ref()
        .map(|s| s.time_zone.clone())
        .filter(|tz| !tz.is_empty());

    let reminders = event
        .reminders
        .map(|r| {
            r.overrides
                .iter()
                .map(|o| Reminder { minutes: o.minutes })
                .collect()
        })
        .unwrap_or_default();

    Ok(Event {
        id: event.id,
        summary: event.summary,
        location: if event.location.is_empty() {
            None
        } else {
            Some(event.location)
        },
        start,
        end,
        time_zone,
        reminders,
    })
}

fn event_time_from_google(time: &EventDateTime) -> Option<EventTime> {
    if let Some(dt) = time.date_time {
        Some(EventTime::DateTime(dt.fixed_offset()))
    } else {
        time.date.map(EventTime::Date)
    }
}
