//! Make sure the club and every league have a remote calendar.

use tracing::{Instrument, info, warn};

use crate::calendar::Calendar;
use crate::error::GameplanResult;
use crate::gateway::CalendarGateway;
use crate::store::Store;
use crate::sync::RunContext;

#[derive(Debug, Clone)]
pub struct BootstrapSettings {
    pub club_name: String,
    pub time_zone: String,
    /// Principal that gets read access to every calendar.
    pub share_with: Option<String>,
}

/// Create missing calendars and share unshared ones.
///
/// Provider failures are logged and skipped so the rest of the run can
/// go ahead; only store reads propagate.
pub async fn ensure_calendars(
    store: &Store,
    gateway: &dyn CalendarGateway,
    settings: &BootstrapSettings,
    ctx: &mut RunContext,
) -> GameplanResult<()> {
    let span = ctx.span().clone();
    ensure_calendars_inner(store, gateway, settings, ctx)
        .instrument(span)
        .await
}

async fn ensure_calendars_inner(
    store: &Store,
    gateway: &dyn CalendarGateway,
    settings: &BootstrapSettings,
    ctx: &mut RunContext,
) -> GameplanResult<()> {
    if store.club_calendar()?.is_none() {
        match gateway
            .create_calendar(&settings.club_name, &settings.time_zone)
            .await
        {
            Ok(remote_id) => {
                register(store, Calendar::club(remote_id), ctx);
            }
            Err(e) => warn!(error = %e, "Could not create club calendar"),
        }
    }

    for league in store.leagues()? {
        if store.calendar_for_league(&league)?.is_some() {
            continue;
        }

        let name = format!("{} {}", settings.club_name, league);
        match gateway.create_calendar(&name, &settings.time_zone).await {
            Ok(remote_id) => {
                register(store, Calendar::for_league(league, remote_id), ctx);
            }
            Err(e) => warn!(league, error = %e, "Could not create league calendar"),
        }
    }

    if let Some(principal) = settings.share_with.as_deref() {
        share_all(store, gateway, principal, ctx).await?;
    }

    Ok(())
}

fn register(store: &Store, calendar: Calendar, ctx: &mut RunContext) {
    match store.insert_calendar_if_absent(&calendar) {
        Ok(true) => {
            info!(calendar = calendar.label(), remote = %calendar.google_calendar_id, "Created calendar");
            ctx.counters.calendars_created += 1;
        }
        Ok(false) => warn!(
            calendar = calendar.label(),
            "Calendar already registered, remote duplicate left in place"
        ),
        Err(e) => warn!(calendar = calendar.label(), error = %e, "Could not register calendar"),
    }
}

async fn share_all(
    store: &Store,
    gateway: &dyn CalendarGateway,
    principal: &str,
    ctx: &mut RunContext,
) -> GameplanResult<()> {
    for calendar in store.calendars()?.into_iter().filter(|c| !c.is_shared) {
        if let Err(e) = gateway
            .share_calendar(&calendar.google_calendar_id, principal)
            .await
        {
            warn!(calendar = calendar.label(), error = %e, "Could not share calendar");
            continue;
        }

        match store.mark_shared(&calendar.id) {
            Ok(()) => {
                info!(calendar = calendar.label(), principal, "Shared calendar");
                ctx.counters.calendars_shared += 1;
            }
            Err(e) => warn!(calendar = calendar.label(), error = %e, "Could not mark calendar shared"),
        }
    }

    Ok(())
}
