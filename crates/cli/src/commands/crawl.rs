//! Crawl command handler.
//!
//! Runs a crawl in the foreground and writes the snapshot the `index`
//! command reads.

use super::stderr_progress;
use clap::Args;
use siteqa_core::{config::AppConfig, AppResult};
use siteqa_knowledge::{CrawlRequest, SiteCrawler};

/// Crawl a website into the snapshot
#[derive(Args, Debug)]
pub struct CrawlCommand {
    /// First page to fetch; only its registered domain is followed
    pub start_url: String,

    /// Maximum number of pages to keep (default from config)
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CrawlCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing crawl command for {}", self.start_url);
        config.validate()?;

        let request = CrawlRequest::parse(
            &self.start_url,
            self.max_pages.unwrap_or(config.crawl.max_pages),
        )?;

        let crawler = SiteCrawler::new(&config.crawl, config.snapshot_path())?
            .with_progress(stderr_progress(self.json));
        let report = crawler.crawl(&request).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            let elapsed = report.finished_at - report.started_at;
            println!(
                "Crawled {} pages from {} in {:.2}s",
                report.pages,
                report.start_url,
                elapsed.num_milliseconds() as f64 / 1000.0
            );
            println!("Snapshot: {}", crawler.snapshot_path().display());
        }

        Ok(())
    }
}
