use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{GameplanError, GameplanResult};
use crate::game::GameId;
use crate::ingest::{GameSource, RawGame};
use crate::source::html::{cell_text, tag_blocks};

const CALLBACK: &str = "jsoncallback";
const DATE_FORMAT: &str = "%d.%m.%Y, %H:%M";
const CELLS_PER_ROW: usize = 7;

/// Club schedule published by probasket as a JSONP document whose `html`
/// field holds a table with one row per game.
pub struct ProbasketSource {
    client: reqwest::Client,
    url: String,
    club_id: String,
    tz: Tz,
}

#[derive(Deserialize)]
struct SchedulePayload {
    html: String,
}

impl ProbasketSource {
    pub fn new(url: impl Into<String>, club_id: impl Into<String>, tz: Tz) -> Self {
        ProbasketSource {
            client: reqwest::Client::new(),
            url: url.into(),
            club_id: club_id.into(),
            tz,
        }
    }
}

#[async_trait]
impl GameSource for ProbasketSource {
    async fn fetch(&self) -> GameplanResult<Vec<RawGame>> {
        debug!(url = %self.url, club = %self.club_id, "Fetching schedule");

        let response = self
            .client
            .get(&self.url)
            .query(&[("club", self.club_id.as_str()), ("jsoncallback", CALLBACK)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GameplanError::Source(format!(
                "Schedule request returned {status}"
            )));
        }

        let body = response.text().await?;
        let payload: SchedulePayload = serde_json::from_str(strip_jsonp(&body)?)?;
        let games = parse_schedule(&payload.html, self.tz);

        info!(count = games.len(), "Fetched schedule");
        Ok(games)
    }
}

/// Unwrap `callback({...});` into the JSON document inside.
pub fn strip_jsonp(body: &str) -> GameplanResult<&str> {
    let body = body.trim();
    match (body.find('('), body.rfind(')')) {
        (Some(open), Some(close)) if close > open => Ok(&body[open + 1..close]),
        _ => Err(GameplanError::Source(
            "Schedule response is not a JSONP document".into(),
        )),
    }
}

/// Read the games out of the schedule table. The first row is the header.
/// Rows with fewer than seven cells are skipped.
pub fn parse_schedule(html: &str, tz: Tz) -> Vec<RawGame> {
    tag_blocks(html, "<tr", "</tr>")
        .into_iter()
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<String> = tag_blocks(row, "<td", "</td>")
                .into_iter()
                .map(cell_text)
                .collect();

            if cells.len() < CELLS_PER_ROW {
                warn!(cells = cells.len(), "Skipping malformed schedule row");
                return None;
            }

            Some(game_from_cells(&cells, tz))
        })
        .collect()
}

fn game_from_cells(cells: &[String], tz: Tz) -> RawGame {
    let [day, date, league, home, away, gym, result] = [
        &cells[0], &cells[1], &cells[2], &cells[3], &cells[4], &cells[5], &cells[6],
    ];

    RawGame {
        id: GameId::derive(league, home, away),
        date: parse_local_date(date, tz),
        day: day.clone(),
        league: league.clone(),
        home_team: home.clone(),
        away_team: away.clone(),
        gym: gym.clone(),
        result: result.clone(),
    }
}

/// Venue-local civil time to an instant. Blank, unparseable or
/// nonexistent (DST gap) times yield no date.
fn parse_local_date(value: &str, tz: Tz) -> Option<DateTime<FixedOffset>> {
    if value.is_empty() {
        return None;
    }

    let naive = match NaiveDateTime::parse_from_str(value, DATE_FORMAT) {
        Ok(naive) => naive,
        Err(e) => {
            debug!(value, error = %e, "Unparseable game date");
            return None;
        }
    };

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.fixed_offset())
}
