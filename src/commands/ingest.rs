use anyhow::Result;
use gameplan_core::ingest::ingest_from;
use gameplan_core::source::ProbasketSource;
use gameplan_core::sync::RunContext;
use owo_colors::OwoColorize;

use crate::commands::Workspace;
use crate::utils::tui;

pub async fn run() -> Result<()> {
    let workspace = Workspace::load()?;
    let config = &workspace.config;
    let source = ProbasketSource::new(&config.source_url, config.club_id()?, config.tz()?);

    let mut ctx = RunContext::new();
    let spinner = tui::create_spinner("Fetching schedule".to_string());
    let result = ingest_from(&source, &workspace.store, &mut ctx).await;
    spinner.finish_and_clear();

    let summary = result?;
    println!(
        "Games: {} new, {} refreshed",
        summary.inserted.green(),
        summary.updated
    );
    if summary.failed > 0 {
        println!("{}", format!("{} games could not be stored", summary.failed).red());
    }

    Ok(())
}
