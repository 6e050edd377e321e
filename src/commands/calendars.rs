use anyhow::Result;
use owo_colors::OwoColorize;

use crate::commands::Workspace;
use crate::render::Render;

pub fn run() -> Result<()> {
    let workspace = Workspace::load()?;
    let calendars = workspace.store.calendars()?;

    if calendars.is_empty() {
        println!(
            "{}",
            "No calendars registered. Run `gameplan bootstrap` first.".dimmed()
        );
        return Ok(());
    }

    for calendar in calendars {
        let games = match &calendar.league {
            Some(league) => workspace.store.games_in_league(league)?.len(),
            None => workspace.store.games()?.len(),
        };
        println!("{} {}", calendar.render(), format!("{games} games").dimmed());
    }

    Ok(())
}
