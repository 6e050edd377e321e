//! Game records and calendar roles.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Stable identity of a real-world match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(String);

impl GameId {
    /// Derive the identity from the pairing. The same match always yields
    /// the same id; the date is not part of it, so a rescheduled game keeps
    /// its row and its calendar events.
    pub fn derive(league: &str, home_team: &str, away_team: &str) -> Self {
        GameId(slug::slugify(format!("{league} {home_team} {away_team}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for GameId {
    fn from(id: String) -> Self {
        GameId(id)
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        GameId(id.to_string())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two calendars every game is mirrored into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Club,
    Team,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Club, Role::Team];

    /// Column holding this role's event id in the games table.
    pub(crate) fn event_id_column(self) -> &'static str {
        match self {
            Role::Club => "club_calendar_event_id",
            Role::Team => "team_calendar_event_id",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Club => write!(f, "club"),
            Role::Team => write!(f, "team"),
        }
    }
}

/// One scheduled match as stored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    /// `None` until the league publishes a date.
    pub date: Option<DateTime<FixedOffset>>,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub gym: String,
    pub result: String,
    pub club_calendar_event_id: Option<String>,
    pub team_calendar_event_id: Option<String>,
    /// Registry key of the league calendar, once resolved.
    pub team_calendar_id: Option<String>,
}

impl Game {
    pub fn event_id(&self, role: Role) -> Option<&str> {
        match role {
            Role::Club => self.club_calendar_event_id.as_deref(),
            Role::Team => self.team_calendar_event_id.as_deref(),
        }
    }

    pub fn set_event_id(&mut self, role: Role, event_id: Option<String>) {
        match role {
            Role::Club => self.club_calendar_event_id = event_id,
            Role::Team => self.team_calendar_event_id = event_id,
        }
    }

    pub fn has_any_event(&self) -> bool {
        self.club_calendar_event_id.is_some() || self.team_calendar_event_id.is_some()
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} vs. {}", self.league, self.home_team, self.away_team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_id_is_deterministic() {
        let a = GameId::derive("U18 Elite", "BC Emmen", "Lions Luzern");
        let b = GameId::derive("U18 Elite", "BC Emmen", "Lions Luzern");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "u18-elite-bc-emmen-lions-luzern");
    }

    #[test]
    fn test_game_id_distinguishes_home_and_away() {
        let a = GameId::derive("A", "Home", "Away");
        let b = GameId::derive("A", "Away", "Home");
        assert_ne!(a, b);
    }

    #[test]
    fn test_event_id_selects_role_field() {
        let mut game = Game {
            id: GameId::from("g1"),
            date: None,
            league: "A".into(),
            home_team: "H".into(),
            away_team: "W".into(),
            gym: "Hall1".into(),
            result: String::new(),
            club_calendar_event_id: None,
            team_calendar_event_id: None,
            team_calendar_id: None,
        };

        game.set_event_id(Role::Team, Some("ev-team".into()));

        assert_eq!(game.event_id(Role::Club), None);
        assert_eq!(game.event_id(Role::Team), Some("ev-team"));
        assert!(game.has_any_event());
    }
}
