use chrono::{DateTime, FixedOffset};
use rusqlite::{OptionalExtension, Row, params};

use crate::error::{GameplanError, GameplanResult};
use crate::game::{Game, GameId, Role};
use crate::ingest::RawGame;
use crate::store::Store;

const GAME_COLUMNS: &str = "id, date, league, home_team, away_team, gym, result,
    club_calendar_event_id, team_calendar_event_id, team_calendar_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

fn parse_date(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<DateTime<FixedOffset>>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s).map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        }),
    }
}

fn game_from_row(row: &Row<'_>) -> rusqlite::Result<Game> {
    let id: String = row.get(0)?;
    Ok(Game {
        id: GameId::from(id),
        date: parse_date(1, row.get(1)?)?,
        league: row.get(2)?,
        home_team: row.get(3)?,
        away_team: row.get(4)?,
        gym: row.get(5)?,
        result: row.get(6)?,
        club_calendar_event_id: row.get(7)?,
        team_calendar_event_id: row.get(8)?,
        team_calendar_id: row.get(9)?,
    })
}

impl Store {
    /// Insert a game or overwrite its descriptive fields.
    ///
    /// Event ids and the resolved team calendar are never touched here.
    pub fn upsert_game(&self, game: &RawGame) -> GameplanResult<UpsertOutcome> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let date = game.date.map(|d| d.to_rfc3339());

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO games (id, date, league, home_team, away_team, gym, result)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                game.id.as_str(),
                date,
                game.league,
                game.home_team,
                game.away_team,
                game.gym,
                game.result
            ],
        )?;

        if inserted == 0 {
            tx.execute(
                "UPDATE games
                 SET date = ?2, league = ?3, home_team = ?4, away_team = ?5, gym = ?6, result = ?7
                 WHERE id = ?1",
                params![
                    game.id.as_str(),
                    date,
                    game.league,
                    game.home_team,
                    game.away_team,
                    game.gym,
                    game.result
                ],
            )?;
        }

        tx.commit()?;

        Ok(if inserted == 0 {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Inserted
        })
    }

    /// All games, ordered by date (undated last).
    pub fn games(&self) -> GameplanResult<Vec<Game>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {GAME_COLUMNS} FROM games ORDER BY date IS NULL, date, id"
        ))?;
        let rows = stmt.query_map([], game_from_row)?;

        let mut games = Vec::new();
        for row in rows {
            games.push(row?);
        }
        Ok(games)
    }

    pub fn games_in_league(&self, league: &str) -> GameplanResult<Vec<Game>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE league = ?1 ORDER BY date IS NULL, date, id"
        ))?;
        let rows = stmt.query_map(params![league], game_from_row)?;

        let mut games = Vec::new();
        for row in rows {
            games.push(row?);
        }
        Ok(games)
    }

    pub fn game(&self, id: &GameId) -> GameplanResult<Option<Game>> {
        let conn = self.connect()?;
        let game = conn
            .query_row(
                &format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?1"),
                params![id.as_str()],
                game_from_row,
            )
            .optional()?;
        Ok(game)
    }

    /// Distinct non-empty leagues among stored games.
    pub fn leagues(&self) -> GameplanResult<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT league FROM games WHERE TRIM(league) <> '' ORDER BY league",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut leagues = Vec::new();
        for row in rows {
            leagues.push(row?);
        }
        Ok(leagues)
    }

    /// Record (or clear) the remote event id for one role.
    pub fn set_event_id(
        &self,
        id: &GameId,
        role: Role,
        event_id: Option<&str>,
    ) -> GameplanResult<()> {
        let conn = self.connect()?;
        let updated = conn.execute(
            &format!("UPDATE games SET {} = ?2 WHERE id = ?1", role.event_id_column()),
            params![id.as_str(), event_id],
        )?;

        if updated == 0 {
            return Err(GameplanError::NotFoundLocal(format!("game {id}")));
        }
        Ok(())
    }

    pub fn set_team_calendar(&self, id: &GameId, calendar_id: &str) -> GameplanResult<()> {
        let conn = self.connect()?;
        let updated = conn.execute(
            "UPDATE games SET team_calendar_id = ?2 WHERE id = ?1",
            params![id.as_str(), calendar_id],
        )?;

        if updated == 0 {
            return Err(GameplanError::NotFoundLocal(format!("game {id}")));
        }
        Ok(())
    }

    /// Remove a game that has been retracted from both calendars.
    pub fn delete_game(&self, id: &GameId) -> GameplanResult<bool> {
        let conn = self.connect()?;
        let deleted = conn.execute("DELETE FROM games WHERE id = ?1", params![id.as_str()])?;
        Ok(deleted > 0)
    }
}
