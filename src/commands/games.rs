use anyhow::Result;
use owo_colors::OwoColorize;

use crate::commands::Workspace;
use crate::render::Render;

pub fn run() -> Result<()> {
    let workspace = Workspace::load()?;
    let games = workspace.store.games()?;

    if games.is_empty() {
        println!("{}", "No games stored. Run `gameplan ingest` first.".dimmed());
        return Ok(());
    }

    for game in &games {
        println!("{}", game.render());
    }
    println!("\n{} games", games.len());

    Ok(())
}
