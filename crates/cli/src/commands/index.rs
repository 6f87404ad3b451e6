//! Index command handler.

use super::stderr_progress;
use clap::Args;
use siteqa_core::{config::AppConfig, AppResult};
use siteqa_knowledge::Services;

/// Rebuild the vector collection from the snapshot
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index command");

        let services = Services::from_config(config).await?;
        let indexer = services.indexer_with_progress(stderr_progress(self.json))?;
        let report = indexer.run().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else if !report.snapshot_available {
            println!(
                "No crawl snapshot at {}; collection left unchanged. Run `siteqa crawl` first.",
                indexer.snapshot_path().display()
            );
        } else {
            println!(
                "Indexed {} fragments from {} documents into '{}' in {:.2}s ({} replaced)",
                report.fragment_count,
                report.document_count,
                services.index.collection_name(),
                report.duration_secs,
                report.removed_count
            );
        }

        Ok(())
    }
}
