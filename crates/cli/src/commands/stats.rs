//! Stats command handler.

use clap::Args;
use siteqa_core::{config::AppConfig, AppResult};
use siteqa_knowledge::{CrawlSnapshot, Services};

/// Show collection statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let services = Services::from_config(config).await?;
        let fragments = services.index.count().await?;

        let snapshot_path = config.snapshot_path();
        let documents = match CrawlSnapshot::load(&snapshot_path) {
            Ok(snapshot) => Some(snapshot.len()),
            Err(e) => {
                tracing::debug!("Snapshot not readable: {}", e);
                None
            }
        };

        if self.json {
            let output = serde_json::json!({
                "collection": services.index.collection_name(),
                "fragments": fragments,
                "snapshotPath": snapshot_path,
                "snapshotDocuments": documents,
                "embedding": {
                    "provider": services.embedder.provider_name(),
                    "model": services.embedder.model_name(),
                    "dimensions": services.embedder.dimensions(),
                },
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Collection: {}", services.index.collection_name());
            println!("  Fragments: {}", fragments);
            match documents {
                Some(count) => println!("  Snapshot documents: {}", count),
                None => println!("  Snapshot: none at {}", snapshot_path.display()),
            }
            println!(
                "  Embeddings: {} ({}, {} dims)",
                services.embedder.provider_name(),
                services.embedder.model_name(),
                services.embedder.dimensions()
            );
        }

        Ok(())
    }
}
