use rusqlite::{OptionalExtension, Row, params};

use crate::calendar::Calendar;
use crate::error::{GameplanError, GameplanResult};
use crate::store::Store;

const CALENDAR_COLUMNS: &str = "id, google_calendar_id, league, is_club_calendar, is_shared";

fn calendar_from_row(row: &Row<'_>) -> rusqlite::Result<Calendar> {
    Ok(Calendar {
        id: row.get(0)?,
        google_calendar_id: row.get(1)?,
        league: row.get(2)?,
        is_club_calendar: row.get(3)?,
        is_shared: row.get(4)?,
    })
}

impl Store {
    pub fn calendars(&self) -> GameplanResult<Vec<Calendar>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CALENDAR_COLUMNS} FROM calendars ORDER BY is_club_calendar DESC, league"
        ))?;
        let rows = stmt.query_map([], calendar_from_row)?;

        let mut calendars = Vec::new();
        for row in rows {
            calendars.push(row?);
        }
        Ok(calendars)
    }

    pub fn club_calendar(&self) -> GameplanResult<Option<Calendar>> {
        let conn = self.connect()?;
        let calendar = conn
            .query_row(
                &format!("SELECT {CALENDAR_COLUMNS} FROM calendars WHERE is_club_calendar = 1"),
                [],
                calendar_from_row,
            )
            .optional()?;
        Ok(calendar)
    }

    pub fn calendar_for_league(&self, league: &str) -> GameplanResult<Option<Calendar>> {
        let conn = self.connect()?;
        let calendar = conn
            .query_row(
                &format!("SELECT {CALENDAR_COLUMNS} FROM calendars WHERE league = ?1"),
                params![league],
                calendar_from_row,
            )
            .optional()?;
        Ok(calendar)
    }

    /// Look up a registry row by its local key.
    pub fn calendar(&self, id: &str) -> GameplanResult<Option<Calendar>> {
        let conn = self.connect()?;
        let calendar = conn
            .query_row(
                &format!("SELECT {CALENDAR_COLUMNS} FROM calendars WHERE id = ?1"),
                params![id],
                calendar_from_row,
            )
            .optional()?;
        Ok(calendar)
    }

    /// Insert a registry row unless one for the same league (or a club row)
    /// already exists. Returns whether a row was written.
    pub fn insert_calendar_if_absent(&self, calendar: &Calendar) -> GameplanResult<bool> {
        let conn = self.connect()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO calendars (id, google_calendar_id, league, is_club_calendar, is_shared)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                calendar.id,
                calendar.google_calendar_id,
                calendar.league,
                calendar.is_club_calendar,
                calendar.is_shared
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn mark_shared(&self, id: &str) -> GameplanResult<()> {
        let conn = self.connect()?;
        let updated = conn.execute(
            "UPDATE calendars SET is_shared = 1 WHERE id = ?1",
            params![id],
        )?;

        if updated == 0 {
            return Err(GameplanError::NotFoundLocal(format!("calendar {id}")));
        }
        Ok(())
    }

    /// Drop the registry row pointing at a remote calendar that was deleted.
    ///
    /// Event ids stored against that calendar are cleared in the same
    /// transaction, so the next run creates the events again in whatever
    /// calendar replaces it.
    pub fn delete_calendar_by_remote_id(&self, google_calendar_id: &str) -> GameplanResult<bool> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let rows = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {CALENDAR_COLUMNS} FROM calendars WHERE google_calendar_id = ?1"
            ))?;
            let rows = stmt.query_map(params![google_calendar_id], calendar_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        for calendar in &rows {
            if calendar.is_club_calendar {
                tx.execute("UPDATE games SET club_calendar_event_id = NULL", [])?;
            } else {
                tx.execute(
                    "UPDATE games
                     SET team_calendar_event_id = NULL, team_calendar_id = NULL
                     WHERE team_calendar_id = ?1
                        OR (team_calendar_id IS NULL AND league = ?2)",
                    params![calendar.id, calendar.league],
                )?;
            }
            tx.execute("DELETE FROM calendars WHERE id = ?1", params![calendar.id])?;
        }

        tx.commit()?;
        Ok(!rows.is_empty())
    }
}
