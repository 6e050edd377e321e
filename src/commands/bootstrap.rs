use anyhow::Result;
use gameplan_core::bootstrap::ensure_calendars;
use gameplan_core::sync::RunContext;

use crate::commands::Workspace;
use crate::render::Render;
use crate::utils::tui;

pub async fn run() -> Result<()> {
    let workspace = Workspace::load()?;
    let gateway = workspace.gateway().await?;
    let settings = workspace.config.bootstrap_settings();

    let mut ctx = RunContext::new();
    let spinner = tui::create_spinner("Creating calendars".to_string());
    let result = ensure_calendars(&workspace.store, &gateway, &settings, &mut ctx).await;
    spinner.finish_and_clear();
    result?;

    for calendar in workspace.store.calendars()? {
        println!("{}", calendar.render());
    }
    println!(
        "\n{} created, {} shared",
        ctx.counters.calendars_created, ctx.counters.calendars_shared
    );

    Ok(())
}
