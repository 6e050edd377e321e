//! One complete pass: ingest, bootstrap, reconcile, notify.

use tracing::{error, info, warn};

use crate::bootstrap::{BootstrapSettings, ensure_calendars};
use crate::error::GameplanResult;
use crate::gateway::CalendarGateway;
use crate::ingest::{GameSource, ingest_from};
use crate::notify::Notifier;
use crate::store::Store;
use crate::sync::{EventSettings, Reconciler, RunContext, Strategy};

pub const SUMMARY_TITLE: &str = "Gameplan run";
pub const ERROR_TITLE: &str = "Gameplan run failed";

pub struct RunOptions {
    pub strategy: Strategy,
    pub bootstrap: BootstrapSettings,
    pub events: EventSettings,
}

pub struct Pipeline<'a> {
    pub store: &'a Store,
    pub source: &'a dyn GameSource,
    pub gateway: &'a dyn CalendarGateway,
    pub notifier: &'a dyn Notifier,
}

impl Pipeline<'_> {
    /// Run every stage in order and send one notification at the end.
    ///
    /// A schedule that cannot be fetched only skips ingestion; the stored
    /// games are still reconciled. A fatal error is reported through the
    /// notifier before it is returned.
    pub async fn run(&self, options: &RunOptions) -> GameplanResult<RunContext> {
        let mut ctx = RunContext::new();

        match self.stages(&mut ctx, options).await {
            Ok(()) => {
                info!(elapsed = ?ctx.elapsed(), "Run finished");
                self.notifier.notify(SUMMARY_TITLE, &ctx.summary()).await;
                Ok(ctx)
            }
            Err(e) => {
                error!(error = %e, "Run aborted");
                self.notifier.notify(ERROR_TITLE, &e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn stages(&self, ctx: &mut RunContext, options: &RunOptions) -> GameplanResult<()> {
        if let Err(e) = ingest_from(self.source, self.store, ctx).await {
            warn!(error = %e, "Could not ingest schedule, reconciling stored games");
        }

        ensure_calendars(self.store, self.gateway, &options.bootstrap, ctx).await?;

        Reconciler::new(self.store, self.gateway, &options.events)
            .check_games(ctx, options.strategy)
            .await
    }
}
