//! Counters and failures accumulated during a run.

use std::fmt;

use serde::Serialize;

use crate::game::{GameId, Role};
use crate::sync::DiffKind;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub games_inserted: usize,
    pub games_updated: usize,
    pub calendars_created: usize,
    pub calendars_shared: usize,

    pub created_club: usize,
    pub updated_club: usize,
    pub unchanged_club: usize,
    pub created_team: usize,
    pub updated_team: usize,
    pub unchanged_team: usize,
    pub no_date: usize,
    pub deleted: usize,
    /// Games skipped because their league has no calendar yet.
    pub skipped_no_calendar: usize,
    /// Stored event ids with no matching remote event.
    pub missing: usize,
    pub failed: usize,
}

impl RunCounters {
    /// Count an acknowledged remote operation.
    pub fn record(&mut self, role: Role, kind: DiffKind) {
        match (role, kind) {
            (Role::Club, DiffKind::Create) => self.created_club += 1,
            (Role::Club, DiffKind::Update) => self.updated_club += 1,
            (Role::Team, DiffKind::Create) => self.created_team += 1,
            (Role::Team, DiffKind::Update) => self.updated_team += 1,
            (_, DiffKind::Delete) => self.deleted += 1,
        }
    }

    pub fn unchanged(&mut self, role: Role) {
        match role {
            Role::Club => self.unchanged_club += 1,
            Role::Team => self.unchanged_team += 1,
        }
    }

    pub fn created(&self) -> usize {
        self.created_club + self.created_team
    }

    pub fn updated(&self) -> usize {
        self.updated_club + self.updated_team
    }

    pub fn unchanged_total(&self) -> usize {
        self.unchanged_club + self.unchanged_team
    }
}

impl fmt::Display for RunCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Games: {} new, {} refreshed",
            self.games_inserted, self.games_updated
        )?;
        if self.calendars_created > 0 || self.calendars_shared > 0 {
            writeln!(
                f,
                "Calendars: {} created, {} shared",
                self.calendars_created, self.calendars_shared
            )?;
        }
        writeln!(
            f,
            "Club: {} created, {} updated, {} unchanged",
            self.created_club, self.updated_club, self.unchanged_club
        )?;
        writeln!(
            f,
            "Team: {} created, {} updated, {} unchanged",
            self.created_team, self.updated_team, self.unchanged_team
        )?;
        write!(
            f,
            "No date: {}, deleted: {}, skipped: {}, missing: {}, failed: {}",
            self.no_date, self.deleted, self.skipped_no_calendar, self.missing, self.failed
        )
    }
}

/// An operation that did not complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionFailure {
    pub game_id: GameId,
    pub role: Role,
    pub kind: DiffKind,
    pub error: String,
}

impl fmt::Display for ActionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}]: {}",
            self.kind, self.game_id, self.role, self.error
        )
    }
}
