//! Long-lived service objects shared by the CLI and the HTTP server.

use crate::crawl::SiteCrawler;
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::indexer::Indexer;
use crate::lancedb_index::LanceDbIndex;
use crate::memory_index::MemoryIndex;
use crate::progress::ProgressReporter;
use crate::rag::QaEngine;
use crate::vector_index::VectorIndex;
use siteqa_core::{AppConfig, AppResult};
use siteqa_llm::{create_client, LlmClient};
use siteqa_prompt::{load_prompt_or_default, GROUNDED_QA_PROMPT_ID};
use std::sync::Arc;
use std::time::Duration;

/// Every handle a request needs, built once at startup.
#[derive(Clone)]
pub struct Services {
    pub config: AppConfig,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub index: Arc<dyn VectorIndex>,
    pub llm: Arc<dyn LlmClient>,
    pub indexer: Arc<Indexer>,
    pub qa: Arc<QaEngine>,
    pub crawler: Arc<SiteCrawler>,
}

impl Services {
    /// Services backed by the on-disk LanceDB collection.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;
        let embedder = create_provider(&config.embedding)?;
        let index = LanceDbIndex::open(
            &config.vector_db_path(),
            &config.data.collection,
            embedder.clone(),
        )
        .await?;
        let llm = create_client(&config.llm)?;

        Self::assemble(config, embedder, Arc::new(index), llm)
    }

    /// Services backed by an in-memory collection that lives as long as the
    /// process.
    pub fn ephemeral(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;
        let embedder = create_provider(&config.embedding)?;
        let index = MemoryIndex::new(config.data.collection.clone(), embedder.clone());
        let llm = create_client(&config.llm)?;

        Self::assemble(config, embedder, Arc::new(index), llm)
    }

    /// Wire the pipelines around caller-supplied capabilities.
    pub fn assemble(
        config: &AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmClient>,
    ) -> AppResult<Self> {
        let indexer = Indexer::new(
            index.clone(),
            config.snapshot_path(),
            config.chunking,
            config.indexing.batch_size,
        )?;

        let prompt = load_prompt_or_default(&config.workspace, GROUNDED_QA_PROMPT_ID)?;
        let qa = QaEngine::new(index.clone(), llm.clone(), config.llm.model.clone())
            .with_prompt(prompt)
            .with_temperature(config.llm.temperature)
            .with_generation_timeout(Duration::from_secs(config.llm.timeout_secs));

        let crawler = SiteCrawler::new(&config.crawl, config.snapshot_path())?;

        tracing::debug!(
            collection = %index.collection_name(),
            embedding = %embedder.provider_name(),
            llm = %llm.provider_name(),
            "Services ready"
        );

        Ok(Self {
            config: config.clone(),
            embedder,
            index,
            llm,
            indexer: Arc::new(indexer),
            qa: Arc::new(qa),
            crawler: Arc::new(crawler),
        })
    }

    /// A fresh indexer over the shared collection that reports progress.
    pub fn indexer_with_progress(&self, progress: ProgressReporter) -> AppResult<Indexer> {
        Ok(Indexer::new(
            self.index.clone(),
            self.config.snapshot_path(),
            self.config.chunking,
            self.config.indexing.batch_size,
        )?
        .with_progress(progress))
    }
}
