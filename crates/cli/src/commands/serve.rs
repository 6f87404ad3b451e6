//! Serve command handler.

use clap::Args;
use siteqa_core::{config::AppConfig, AppResult};
use siteqa_knowledge::Services;

/// Run the HTTP service
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind, e.g. 127.0.0.1:8000 (default from config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Keep the vector collection in memory instead of on disk
    #[arg(long)]
    pub ephemeral: bool,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");
        tracing::debug!("Serve options: {:?}", self);

        let services = if self.ephemeral {
            Services::ephemeral(config)?
        } else {
            Services::from_config(config).await?
        };

        let bind = self.bind.as_deref().unwrap_or(&config.server.bind);
        siteqa_server::serve(services, bind).await
    }
}
