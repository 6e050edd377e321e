use anyhow::Result;
use gameplan_core::gateway::CalendarGateway;
use owo_colors::OwoColorize;

use crate::commands::Workspace;
use crate::render::Render;
use crate::utils::tui;

pub async fn list() -> Result<()> {
    let workspace = Workspace::load()?;
    let gateway = workspace.gateway().await?;

    let spinner = tui::create_spinner("Fetching calendars".to_string());
    let result = gateway.list_calendars().await;
    spinner.finish_and_clear();

    for calendar in result? {
        println!("{}", calendar.render());
    }

    Ok(())
}

/// Delete every non-primary calendar, drop the matching registry rows and
/// forget the event ids stored against them.
pub async fn delete_all(yes: bool) -> Result<()> {
    let workspace = Workspace::load()?;
    let gateway = workspace.gateway().await?;

    let calendars: Vec<_> = gateway
        .list_calendars()
        .await?
        .into_iter()
        .filter(|c| !c.primary)
        .collect();

    if calendars.is_empty() {
        println!("{}", "No calendars to delete.".dimmed());
        return Ok(());
    }

    if !yes {
        for calendar in &calendars {
            println!("{}", calendar.render());
        }
        anyhow::bail!(
            "This deletes {} calendars and every event in them. Re-run with --yes to confirm.",
            calendars.len()
        );
    }

    let mut deleted = 0;
    for calendar in &calendars {
        match gateway.delete_calendar(&calendar.id).await {
            Ok(()) => {
                workspace.store.delete_calendar_by_remote_id(&calendar.id)?;
                println!("{} {}", "-".red(), calendar.name);
                deleted += 1;
            }
            Err(e) => println!("{} {} {}", "!".red(), calendar.name, e.to_string().red()),
        }
    }

    println!("\nDeleted {deleted} of {} calendars", calendars.len());

    Ok(())
}
