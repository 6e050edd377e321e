//! The reconciliation engine.
//!
//! Compares stored games against the events fetched from every known
//! calendar and creates, updates or deletes remote events so that each
//! dated game has one up-to-date event on the club calendar and one on its
//! league's calendar.

mod apply;
mod compare;
mod context;
mod diff_kind;
mod game_diff;
mod payload;
mod plan;
mod report;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{Instrument, info, warn};

use crate::calendar::Calendar;
use crate::error::{GameplanError, GameplanResult};
use crate::gateway::CalendarGateway;
use crate::store::Store;

pub use compare::matches;
pub use context::RunContext;
pub use diff_kind::DiffKind;
pub use game_diff::GameDiff;
pub use payload::{EventSettings, build_event};
pub use plan::{Planner, Registry, RemoteEvents};
pub use report::{ActionFailure, RunCounters};

/// How queued actions reach the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One request per action.
    Sequential,
    /// Actions grouped into batch requests.
    #[default]
    Batched,
}

impl FromStr for Strategy {
    type Err = GameplanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Strategy::Sequential),
            "batched" => Ok(Strategy::Batched),
            other => Err(GameplanError::Configuration(format!(
                "Unknown strategy '{other}' (expected 'sequential' or 'batched')"
            ))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Sequential => write!(f, "sequential"),
            Strategy::Batched => write!(f, "batched"),
        }
    }
}

pub struct Reconciler<'a> {
    store: &'a Store,
    gateway: &'a dyn CalendarGateway,
    settings: &'a EventSettings,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        store: &'a Store,
        gateway: &'a dyn CalendarGateway,
        settings: &'a EventSettings,
    ) -> Self {
        Reconciler {
            store,
            gateway,
            settings,
        }
    }

    /// Reconcile every stored game against the remote calendars.
    ///
    /// Fails only when there is no club calendar or the store cannot be
    /// read; everything per game or per operation ends up in `ctx`.
    pub async fn check_games(&self, ctx: &mut RunContext, strategy: Strategy) -> GameplanResult<()> {
        let span = ctx.span().clone();
        self.check_games_inner(ctx, strategy).instrument(span).await
    }

    async fn check_games_inner(&self, ctx: &mut RunContext, strategy: Strategy) -> GameplanResult<()> {
        let club = self.store.club_calendar()?.ok_or_else(|| {
            GameplanError::Configuration(
                "No club calendar registered; run the calendar bootstrap first".into(),
            )
        })?;

        let calendars = self.store.calendars()?;
        let mut games = self.store.games()?;
        let remote = self.fetch_remote_events(&calendars).await;

        let registry = Registry::new(&club, &calendars);
        let planner = Planner {
            store: self.store,
            registry: &registry,
            remote: &remote,
            settings: self.settings,
        };
        let diffs = planner.plan(&mut games, ctx);

        info!(
            games = games.len(),
            queued = diffs.len(),
            %strategy,
            "Reconciling"
        );

        match strategy {
            Strategy::Sequential => self.apply_sequential(&diffs, ctx).await,
            Strategy::Batched => self.apply_batched(&diffs, ctx).await,
        }

        info!(
            created = ctx.counters.created(),
            updated = ctx.counters.updated(),
            unchanged = ctx.counters.unchanged_total(),
            deleted = ctx.counters.deleted,
            failed = ctx.counters.failed,
            "Reconciliation finished"
        );

        Ok(())
    }

    /// List events of every registered calendar. A calendar that cannot be
    /// listed is treated as empty for this run.
    async fn fetch_remote_events(&self, calendars: &[Calendar]) -> RemoteEvents {
        let mut remote = RemoteEvents::default();

        for calendar in calendars {
            match self
                .gateway
                .list_events(&calendar.google_calendar_id, self.settings.max_results)
                .await
            {
                Ok(events) => {
                    if events.is_empty() {
                        info!(calendar = calendar.label(), "No events found");
                    }
                    remote.insert_calendar(&calendar.google_calendar_id, events);
                }
                Err(e) => {
                    warn!(calendar = calendar.label(), error = %e, "Could not list events");
                }
            }
        }

        remote
    }
}
