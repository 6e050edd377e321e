pub mod auth;
pub mod bootstrap;
pub mod calendars;
pub mod check;
pub mod games;
pub mod ingest;
pub mod remote;
pub mod run;

use anyhow::Result;
use gameplan_core::config::GameplanConfig;
use gameplan_core::store::Store;
use gameplan_core::sync::RunContext;
use gameplan_provider_google::GoogleGateway;

use crate::render::Render;

/// Config plus the store it points at.
pub struct Workspace {
    pub config: GameplanConfig,
    pub store: Store,
}

impl Workspace {
    pub fn load() -> Result<Self> {
        let config = GameplanConfig::load()?;
        let store = Store::open(config.database_path())?;
        Ok(Workspace { config, store })
    }

    pub async fn gateway(&self) -> Result<GoogleGateway> {
        Ok(GoogleGateway::connect(self.config.google_account()?).await?)
    }
}

pub fn print_summary(ctx: &RunContext) {
    println!("{}", ctx.counters.render());

    for failure in &ctx.failures {
        println!("   {}", failure.render());
    }
}
