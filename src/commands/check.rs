use anyhow::Result;
use gameplan_core::sync::{Reconciler, RunContext, Strategy};

use crate::commands::{Workspace, print_summary};
use crate::utils::tui;

pub async fn run(strategy: Option<Strategy>) -> Result<()> {
    let workspace = Workspace::load()?;
    let gateway = workspace.gateway().await?;
    let settings = workspace.config.event_settings()?;
    let strategy = strategy.unwrap_or(workspace.config.strategy);

    let mut ctx = RunContext::new();
    let spinner = tui::create_spinner(format!("Reconciling ({strategy})"));
    let result = Reconciler::new(&workspace.store, &gateway, &settings)
        .check_games(&mut ctx, strategy)
        .await;
    spinner.finish_and_clear();
    result?;

    print_summary(&ctx);

    Ok(())
}
