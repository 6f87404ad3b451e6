//! Shared fixtures: stub completion clients and index wrappers.

use crate::embeddings::TrigramProvider;
use crate::memory_index::MemoryIndex;
use crate::snapshot::CrawlSnapshot;
use crate::types::{Fragment, ScoredFragment};
use crate::vector_index::VectorIndex;
use siteqa_core::{AppError, AppResult};
use siteqa_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use siteqa_prompt::FALLBACK_ANSWER;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const CONTEXT_OPEN: &str = "## Context from the website:\n---\n";
const CONTEXT_CLOSE: &str = "\n---\n\n## User's question:\n";
const ANSWER_MARKER: &str = "\n\n## Answer:";

fn response(content: impl Into<String>) -> LlmResponse {
    LlmResponse {
        content: content.into(),
        model: "stub".to_string(),
        usage: LlmUsage::new(0, 0),
    }
}

/// Split a rendered grounded prompt into (context, question).
pub fn prompt_parts(prompt: &str) -> (String, String) {
    let after_open = prompt.split(CONTEXT_OPEN).nth(1).unwrap_or_default();
    let mut halves = after_open.splitn(2, CONTEXT_CLOSE);
    let context = halves.next().unwrap_or_default().to_string();
    let question = halves
        .next()
        .unwrap_or_default()
        .split(ANSWER_MARKER)
        .next()
        .unwrap_or_default()
        .to_string();
    (context, question)
}

/// Behaves like an obedient model: answers from the context when a
/// question keyword appears in it, otherwise replies with the fallback.
pub struct GroundedStub;

#[async_trait::async_trait]
impl LlmClient for GroundedStub {
    fn provider_name(&self) -> &str {
        "grounded-stub"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let (context, question) = prompt_parts(&request.prompt);
        let context = context.to_lowercase();

        let grounded = question
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 3 && *w != "what")
            .any(|w| context.contains(w));

        if grounded {
            let first_line = context.lines().next().unwrap_or_default();
            Ok(response(format!("According to the site: {}", first_line)))
        } else {
            Ok(response(FALLBACK_ANSWER))
        }
    }
}

/// Always fails like an unreachable model server.
pub struct FailingStub;

#[async_trait::async_trait]
impl LlmClient for FailingStub {
    fn provider_name(&self) -> &str {
        "failing-stub"
    }

    async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
        Err(AppError::Generation("connection refused".to_string()))
    }
}

/// Never answers within any reasonable timeout.
pub struct HangingStub;

#[async_trait::async_trait]
impl LlmClient for HangingStub {
    fn provider_name(&self) -> &str {
        "hanging-stub"
    }

    async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(response("too late"))
    }
}

/// Records every prompt it receives and answers with a constant.
#[derive(Default)]
pub struct RecordingStub {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl LlmClient for RecordingStub {
    fn provider_name(&self) -> &str {
        "recording-stub"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        Ok(response("  recorded  "))
    }
}

/// Wraps an index and delays every query so retrieval time is measurable.
pub struct SlowIndex {
    pub inner: Arc<dyn VectorIndex>,
    pub delay: Duration,
}

#[async_trait::async_trait]
impl VectorIndex for SlowIndex {
    fn collection_name(&self) -> &str {
        self.inner.collection_name()
    }

    async fn add(&self, fragments: &[Fragment]) -> AppResult<()> {
        self.inner.add(fragments).await
    }

    async fn get_all_ids(&self) -> AppResult<Vec<String>> {
        self.inner.get_all_ids().await
    }

    async fn delete(&self, ids: &[String]) -> AppResult<()> {
        self.inner.delete(ids).await
    }

    async fn query(&self, text: &str, top_k: usize) -> AppResult<Vec<ScoredFragment>> {
        tokio::time::sleep(self.delay).await;
        self.inner.query(text, top_k).await
    }

    async fn count(&self) -> AppResult<usize> {
        self.inner.count().await
    }
}

/// An index whose backing store is down.
pub struct UnavailableIndex;

#[async_trait::async_trait]
impl VectorIndex for UnavailableIndex {
    fn collection_name(&self) -> &str {
        "website_content"
    }

    async fn add(&self, _fragments: &[Fragment]) -> AppResult<()> {
        Err(AppError::UpstreamUnavailable("store offline".to_string()))
    }

    async fn get_all_ids(&self) -> AppResult<Vec<String>> {
        Err(AppError::UpstreamUnavailable("store offline".to_string()))
    }

    async fn delete(&self, _ids: &[String]) -> AppResult<()> {
        Err(AppError::UpstreamUnavailable("store offline".to_string()))
    }

    async fn query(&self, _text: &str, _top_k: usize) -> AppResult<Vec<ScoredFragment>> {
        Err(AppError::UpstreamUnavailable("store offline".to_string()))
    }

    async fn count(&self) -> AppResult<usize> {
        Err(AppError::UpstreamUnavailable("store offline".to_string()))
    }
}

/// Delegates to `inner` but fails the `fail_on`-th call to `add` (1-based).
pub struct FailingAddIndex {
    pub inner: Arc<dyn VectorIndex>,
    pub fail_on: usize,
    pub add_calls: AtomicUsize,
}

impl FailingAddIndex {
    pub fn new(inner: Arc<dyn VectorIndex>, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            add_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl VectorIndex for FailingAddIndex {
    fn collection_name(&self) -> &str {
        self.inner.collection_name()
    }

    async fn add(&self, fragments: &[Fragment]) -> AppResult<()> {
        let call = self.add_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(AppError::UpstreamUnavailable(format!("insert {} rejected", call)));
        }
        self.inner.add(fragments).await
    }

    async fn get_all_ids(&self) -> AppResult<Vec<String>> {
        self.inner.get_all_ids().await
    }

    async fn delete(&self, ids: &[String]) -> AppResult<()> {
        self.inner.delete(ids).await
    }

    async fn query(&self, text: &str, top_k: usize) -> AppResult<Vec<ScoredFragment>> {
        self.inner.query(text, top_k).await
    }

    async fn count(&self) -> AppResult<usize> {
        self.inner.count().await
    }
}

pub fn memory_index() -> Arc<dyn VectorIndex> {
    Arc::new(MemoryIndex::new(
        "website_content",
        Arc::new(TrigramProvider::new(384)),
    ))
}

/// Write `pages` as a crawl snapshot under `dir`.
pub fn write_snapshot(dir: &Path, pages: &[(&str, &str)]) -> PathBuf {
    let path = dir.join("data/url_to_doc.json");
    let mut snapshot = CrawlSnapshot::new();
    for (url, text) in pages {
        snapshot.insert(*url, *text);
    }
    snapshot.save(&path).unwrap();
    path
}

/// The two-page site used across scenarios.
pub const SITE: &[(&str, &str)] = &[
    ("https://x/a", "Alpha library docs about widgets."),
    ("https://x/b", "Unrelated page about cars."),
];
