//! Indexing pipeline: crawl snapshot in, fresh collection out.
//!
//! Every run replaces the whole collection. Old fragments are deleted first,
//! then the new ones are written in fixed-size batches, one batch at a time.

use crate::chunker::chunk_text;
use crate::progress::ProgressReporter;
use crate::snapshot::CrawlSnapshot;
use crate::types::{Document, Fragment, IndexReport};
use crate::vector_index::VectorIndex;
use siteqa_core::{AppError, AppResult, ChunkingConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Rebuilds a vector collection from the crawl snapshot on disk.
pub struct Indexer {
    index: Arc<dyn VectorIndex>,
    snapshot_path: PathBuf,
    chunking: ChunkingConfig,
    batch_size: usize,
    progress: ProgressReporter,
}

impl Indexer {
    /// # Errors
    /// Returns `AppError::Config` for an invalid chunking configuration or a
    /// zero batch size.
    pub fn new(
        index: Arc<dyn VectorIndex>,
        snapshot_path: impl Into<PathBuf>,
        chunking: ChunkingConfig,
        batch_size: usize,
    ) -> AppResult<Self> {
        chunking.validate()?;
        if batch_size == 0 {
            return Err(AppError::Config(
                "indexing.batchSize must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            index,
            snapshot_path: snapshot_path.into(),
            chunking,
            batch_size,
            progress: ProgressReporter::noop(),
        })
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Replace the collection with fragments built from the current snapshot.
    ///
    /// A missing or unreadable snapshot is not an error: the run logs a
    /// warning, leaves the collection untouched and reports zero fragments.
    #[tracing::instrument(skip(self), fields(collection = %self.index.collection_name()))]
    pub async fn run(&self) -> AppResult<IndexReport> {
        let start = Instant::now();

        let snapshot = match CrawlSnapshot::load(&self.snapshot_path) {
            Ok(snapshot) => snapshot,
            Err(AppError::DataSourceUnavailable(reason)) => {
                tracing::warn!("Nothing to index, collection left unchanged: {}", reason);
                return Ok(IndexReport {
                    duration_secs: start.elapsed().as_secs_f64(),
                    ..IndexReport::default()
                });
            }
            Err(e) => return Err(e),
        };
        self.progress
            .load(snapshot.len() as u64, &self.snapshot_path.to_string_lossy());

        let documents = snapshot.into_documents();
        let fragments = self.build_fragments(&documents)?;
        let mut report = self.replace_collection(&fragments).await?;

        report.document_count = documents.len();
        report.snapshot_available = true;
        report.duration_secs = start.elapsed().as_secs_f64();

        tracing::info!(
            "Indexed {} fragments from {} documents into '{}' in {:.2}s",
            report.fragment_count,
            report.document_count,
            self.index.collection_name(),
            report.duration_secs
        );

        Ok(report)
    }

    /// Chunk documents in snapshot order into fragments with positional ids.
    pub fn build_fragments(&self, documents: &[Document]) -> AppResult<Vec<Fragment>> {
        let mut fragments = Vec::new();

        for (doc_seq, document) in documents.iter().enumerate() {
            let chunks = chunk_text(&document.text, &self.chunking)?;
            if chunks.is_empty() {
                tracing::debug!("Document {} has no text, skipping", document.url);
            }

            fragments.extend(chunks.into_iter().enumerate().map(|(chunk_seq, text)| {
                Fragment {
                    id: Fragment::make_id(doc_seq, chunk_seq),
                    text,
                    source_url: document.url.clone(),
                }
            }));

            self.progress.chunk(
                (doc_seq + 1) as u64,
                Some(documents.len() as u64),
                fragments.len(),
            );
        }

        Ok(fragments)
    }

    /// Delete everything in the collection, then write `fragments` batch by batch.
    async fn replace_collection(&self, fragments: &[Fragment]) -> AppResult<IndexReport> {
        let existing = self.index.get_all_ids().await?;
        if !existing.is_empty() {
            tracing::info!(
                "Removing {} fragments from '{}'",
                existing.len(),
                self.index.collection_name()
            );
            self.index.delete(&existing).await?;
        }
        self.progress
            .clear(existing.len() as u64, self.index.collection_name());

        let total = fragments.len();
        let batch_count = total.div_ceil(self.batch_size);
        let mut written = 0;

        for (batch_no, batch) in fragments.chunks(self.batch_size).enumerate() {
            if let Err(e) = self.index.add(batch).await {
                tracing::error!(
                    "Batch {}/{} failed with {} of {} fragments written: {}",
                    batch_no + 1,
                    batch_count,
                    written,
                    total,
                    e
                );
                return Err(e);
            }

            written += batch.len();
            tracing::debug!("Batch {}/{} written ({} fragments)", batch_no + 1, batch_count, batch.len());
            self.progress
                .index(written as u64, Some(total as u64), batch_no + 1);
        }

        Ok(IndexReport {
            fragment_count: written,
            removed_count: existing.len(),
            batches: batch_count,
            ..IndexReport::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::TrigramProvider;
    use crate::memory_index::MemoryIndex;
    use crate::progress::ProgressEvent;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn memory_index() -> Arc<dyn VectorIndex> {
        Arc::new(MemoryIndex::new(
            "website_content",
            Arc::new(TrigramProvider::new(64)),
        ))
    }

    fn write_snapshot(dir: &TempDir, pages: &[(&str, &str)]) -> PathBuf {
        let path = dir.path().join("url_to_doc.json");
        let mut snapshot = CrawlSnapshot::new();
        for (url, text) in pages {
            snapshot.insert(*url, *text);
        }
        snapshot.save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn test_fragment_ids_follow_snapshot_order() {
        let dir = TempDir::new().unwrap();
        let long = "x".repeat(1_500);
        let path = write_snapshot(
            &dir,
            &[("https://a.test/long", long.as_str()), ("https://a.test/short", "tiny")],
        );

        let index = memory_index();
        let indexer =
            Indexer::new(index.clone(), path, ChunkingConfig::new(800, 100).unwrap(), 100).unwrap();
        let report = indexer.run().await.unwrap();

        // 1500 chars with stride 700: windows at 0, 700 and 1400
        assert_eq!(report.fragment_count, 4);
        assert_eq!(report.document_count, 2);
        assert_eq!(
            index.get_all_ids().await.unwrap(),
            vec!["id_0_0", "id_0_1", "id_0_2", "id_1_0"]
        );
    }

    #[tokio::test]
    async fn test_batches_are_capped() {
        let dir = TempDir::new().unwrap();
        let text = "y".repeat(250);
        let path = write_snapshot(&dir, &[("https://a.test/", text.as_str())]);

        let index = memory_index();
        let indexer =
            Indexer::new(index.clone(), path, ChunkingConfig::new(10, 0).unwrap(), 10).unwrap();
        let report = indexer.run().await.unwrap();

        assert_eq!(report.fragment_count, 25);
        assert_eq!(report.batches, 3);
        assert_eq!(index.count().await.unwrap(), 25);
    }

    #[tokio::test]
    async fn test_missing_snapshot_leaves_collection() {
        let dir = TempDir::new().unwrap();
        let index = memory_index();
        index
            .add(&[Fragment {
                id: "id_0_0".to_string(),
                text: "kept".to_string(),
                source_url: "https://a.test/".to_string(),
            }])
            .await
            .unwrap();

        let indexer = Indexer::new(
            index.clone(),
            dir.path().join("absent.json"),
            ChunkingConfig::default(),
            100,
        )
        .unwrap();
        let report = indexer.run().await.unwrap();

        assert_eq!(report.fragment_count, 0);
        assert!(!report.snapshot_available);
        assert_eq!(index.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_documents_produce_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(&dir, &[("https://a.test/blank", ""), ("https://a.test/", "hi")]);

        let index = memory_index();
        let indexer = Indexer::new(index.clone(), path, ChunkingConfig::default(), 100).unwrap();
        indexer.run().await.unwrap();

        assert_eq!(index.get_all_ids().await.unwrap(), vec!["id_1_0"]);
    }

    #[tokio::test]
    async fn test_progress_phases_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(&dir, &[("https://a.test/", "Alpha")]);

        let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let indexer = Indexer::new(memory_index(), path, ChunkingConfig::default(), 100)
            .unwrap()
            .with_progress(ProgressReporter::new(Arc::new(move |e| {
                sink.lock().unwrap().push(e)
            })));
        indexer.run().await.unwrap();

        let phases: Vec<String> = events.lock().unwrap().iter().map(|e| e.phase.to_string()).collect();
        assert_eq!(phases, vec!["load", "chunk", "clear", "index"]);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let bad_chunking = ChunkingConfig { size: 100, overlap: 100 };
        assert!(Indexer::new(memory_index(), "x.json", bad_chunking, 100).is_err());
        assert!(Indexer::new(memory_index(), "x.json", ChunkingConfig::default(), 0).is_err());
    }
}
