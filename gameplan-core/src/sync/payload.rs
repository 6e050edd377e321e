//! Builds the event body for a game.

use chrono::{DateTime, Duration, FixedOffset};
use chrono_tz::Tz;

use crate::event::{Event, EventTime, Reminder};
use crate::game::Game;

/// Everything about an event that comes from configuration, not the game.
#[derive(Debug, Clone)]
pub struct EventSettings {
    /// Venue timezone the event is displayed in.
    pub time_zone: Tz,
    pub duration_hours: i64,
    pub reminder_minutes: i64,
    /// Page size when listing remote events.
    pub max_results: usize,
}

pub fn build_event(game: &Game, date: DateTime<FixedOffset>, settings: &EventSettings) -> Event {
    let start = date.with_timezone(&settings.time_zone).fixed_offset();
    let end = start + Duration::hours(settings.duration_hours);

    Event {
        id: String::new(),
        summary: format!("{} {} vs. {}", game.league, game.home_team, game.away_team),
        location: if game.gym.is_empty() {
            None
        } else {
            Some(game.gym.clone())
        },
        start: EventTime::DateTime(start),
        end: EventTime::DateTime(end),
        time_zone: Some(settings.time_zone.name().to_string()),
        reminders: vec![Reminder {
            minutes: settings.reminder_minutes,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameId;

    fn settings() -> EventSettings {
        EventSettings {
            time_zone: chrono_tz::Europe::Zurich,
            duration_hours: 2,
            reminder_minutes: 120,
            max_results: 500,
        }
    }

    fn game() -> Game {
        Game {
            id: GameId::from("g1"),
            date: None,
            league: "U18".into(),
            home_team: "BC Emmen".into(),
            away_team: "Lions".into(),
            gym: "Hall1".into(),
            result: String::new(),
            club_calendar_event_id: None,
            team_calendar_event_id: None,
            team_calendar_id: None,
        }
    }

    #[test]
    fn test_payload_fields() {
        let date = DateTime::parse_from_rfc3339("2024-09-01T18:00:00+00:00").unwrap();
        let event = build_event(&game(), date, &settings());

        assert_eq!(event.summary, "U18 BC Emmen vs. Lions");
        assert_eq!(event.location.as_deref(), Some("Hall1"));
        assert_eq!(event.time_zone.as_deref(), Some("Europe/Zurich"));
        assert_eq!(event.reminders, vec![Reminder { minutes: 120 }]);
        assert!(event.id.is_empty());
    }

    #[test]
    fn test_start_is_rendered_in_venue_zone() {
        let date = DateTime::parse_from_rfc3339("2024-09-01T18:00:00+00:00").unwrap();
        let event = build_event(&game(), date, &settings());

        let EventTime::DateTime(start) = event.start else {
            panic!("expected timed start");
        };
        assert_eq!(start, date);
        assert_eq!(start.to_rfc3339(), "2024-09-01T20:00:00+02:00");
    }

    #[test]
    fn test_end_is_two_hours_after_start() {
        let date = DateTime::parse_from_rfc3339("2024-12-01T19:30:00+01:00").unwrap();
        let event = build_event(&game(), date, &settings());

        let (Some(start), Some(end)) = (event.start.instant(), event.end.instant()) else {
            panic!("expected timed event");
        };
        assert_eq!(end - start, Duration::hours(2));
    }

    #[test]
    fn test_empty_gym_has_no_location() {
        let mut g = game();
        g.gym.clear();
        let date = DateTime::parse_from_rfc3339("2024-09-01T18:00:00+00:00").unwrap();
        assert_eq!(build_event(&g, date, &settings()).location, None);
    }
}
