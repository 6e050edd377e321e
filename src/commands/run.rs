use anyhow::Result;
use gameplan_core::notify::notifier_for;
use gameplan_core::run::{Pipeline, RunOptions};
use gameplan_core::source::ProbasketSource;
use gameplan_core::sync::Strategy;

use crate::commands::{Workspace, print_summary};
use crate::utils::tui;

pub async fn run(strategy: Option<Strategy>) -> Result<()> {
    let workspace = Workspace::load()?;
    let config = &workspace.config;

    let options = RunOptions {
        strategy: strategy.unwrap_or(config.strategy),
        bootstrap: config.bootstrap_settings(),
        events: config.event_settings()?,
    };
    let source = ProbasketSource::new(&config.source_url, config.club_id()?, config.tz()?);
    let gateway = workspace.gateway().await?;
    let notifier = notifier_for(config.notify_url.as_deref());

    let pipeline = Pipeline {
        store: &workspace.store,
        source: &source,
        gateway: &gateway,
        notifier: notifier.as_ref(),
    };

    let spinner = tui::create_spinner(format!("Running ({})", options.strategy));
    let result = pipeline.run(&options).await;
    spinner.finish_and_clear();

    let ctx = result?;
    print_summary(&ctx);
    println!("\nFinished in {:.1}s", ctx.elapsed().as_secs_f64());

    Ok(())
}
