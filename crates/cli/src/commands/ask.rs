//! Ask command handler.
//!
//! Answers one question against the on-disk collection, the same way the
//! `/ask` endpoint does.

use clap::Args;
use siteqa_core::{config::AppConfig, AppResult};
use siteqa_knowledge::{AnswerRecord, Services};

/// Ask a question about the indexed website
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of fragments to retrieve (default from config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask options: {:?}", self);

        let services = Services::from_config(config).await?;
        let top_k = self.top_k.unwrap_or(config.ask.default_top_k);
        let record = services.qa.answer_question(&self.question, top_k).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&record)?);
        } else {
            print!("{}", render_text(&record));
        }

        Ok(())
    }
}

fn render_text(record: &AnswerRecord) -> String {
    let mut out = String::new();
    out.push_str("Answer:\n");
    out.push_str(&record.answer);
    out.push_str("\n\n");

    if record.sources.is_empty() {
        out.push_str("Sources: (no sources available)\n");
    } else {
        out.push_str("Sources:\n");
        for source in &record.sources {
            out.push_str(&format!("- {}\n", source.url));
        }
    }

    out.push_str(&format!(
        "\nretrieval {} ms, generation {} ms, total {} ms\n",
        record.timings.retrieval_ms, record.timings.generation_ms, record.timings.total_ms
    ));
    out
}
