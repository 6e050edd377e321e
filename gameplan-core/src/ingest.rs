//! Loading scraped games into the Game Store.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::GameplanResult;
use crate::game::GameId;
use crate::store::{Store, UpsertOutcome};
use crate::sync::RunContext;

/// A game as delivered by a schedule source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGame {
    pub id: GameId,
    pub date: Option<DateTime<FixedOffset>>,
    /// Weekday as printed by the source. Informational only.
    pub day: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub gym: String,
    pub result: String,
}

/// Anything that can produce the current schedule.
#[async_trait]
pub trait GameSource: Send + Sync {
    async fn fetch(&self) -> GameplanResult<Vec<RawGame>>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Upsert every game. A row that cannot be written is logged and skipped.
pub fn ingest(store: &Store, games: &[RawGame]) -> IngestSummary {
    let mut summary = IngestSummary::default();

    for game in games {
        match store.upsert_game(game) {
            Ok(UpsertOutcome::Inserted) => summary.inserted += 1,
            Ok(UpsertOutcome::Updated) => summary.updated += 1,
            Err(e) => {
                warn!(game = %game.id, error = %e, "Could not store game");
                summary.failed += 1;
            }
        }
    }

    info!(
        inserted = summary.inserted,
        updated = summary.updated,
        failed = summary.failed,
        "Ingested games"
    );

    summary
}

/// Fetch from `source` and ingest, recording the counts on the run.
pub async fn ingest_from(
    source: &dyn GameSource,
    store: &Store,
    ctx: &mut RunContext,
) -> GameplanResult<IngestSummary> {
    let games = source.fetch().await?;
    let summary = ingest(store, &games);

    ctx.counters.games_inserted += summary.inserted;
    ctx.counters.games_updated += summary.updated;

    Ok(summary)
}
