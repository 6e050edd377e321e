use anyhow::Result;
use gameplan_core::config::GameplanConfig;

pub async fn run() -> Result<()> {
    println!("Authenticating with Google...");

    let account = gameplan_provider_google::authenticate().await?;

    let mut config = GameplanConfig::load()?;
    config.google_account = Some(account.clone());
    config.save()?;

    println!("\nAuthenticated as: {account}");
    println!("\nRun `gameplan run` to ingest the schedule and fill the calendars.");

    Ok(())
}
