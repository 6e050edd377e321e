//! Calendar registry rows.

use serde::{Deserialize, Serialize};

use crate::constants::CLUB_CALENDAR_KEY;

/// Maps a league (or the club) to a remote calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    /// Local key: the league name, or `"club"`.
    pub id: String,
    /// Remote calendar id returned at creation time. Never changes.
    pub google_calendar_id: String,
    /// `None` only for the club calendar.
    pub league: Option<String>,
    pub is_club_calendar: bool,
    /// Whether the configured principal has been granted access.
    pub is_shared: bool,
}

impl Calendar {
    pub fn club(google_calendar_id: impl Into<String>) -> Self {
        Calendar {
            id: CLUB_CALENDAR_KEY.to_string(),
            google_calendar_id: google_calendar_id.into(),
            league: None,
            is_club_calendar: true,
            is_shared: false,
        }
    }

    pub fn for_league(league: impl Into<String>, google_calendar_id: impl Into<String>) -> Self {
        let league = league.into();
        Calendar {
            id: league.clone(),
            google_calendar_id: google_calendar_id.into(),
            league: Some(league),
            is_club_calendar: false,
            is_shared: false,
        }
    }

    /// Human readable name for logs and the CLI.
    pub fn label(&self) -> &str {
        self.league.as_deref().unwrap_or(CLUB_CALENDAR_KEY)
    }
}
