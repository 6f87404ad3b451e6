//! Command handlers for the SiteQA CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod crawl;
pub mod index;
pub mod serve;
pub mod stats;

pub use ask::AskCommand;
pub use crawl::CrawlCommand;
pub use index::IndexCommand;
pub use serve::ServeCommand;
pub use stats::StatsCommand;

use siteqa_knowledge::{ProgressEvent, ProgressReporter};
use std::sync::Arc;

/// Reporter that prints each progress event on stderr, or stays silent when
/// machine-readable output was requested.
pub(crate) fn stderr_progress(quiet: bool) -> ProgressReporter {
    if quiet {
        return ProgressReporter::noop();
    }
    ProgressReporter::new(Arc::new(|event: ProgressEvent| {
        eprintln!("{}", event.format_simple());
    }))
}
