//! Request handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use siteqa_knowledge::{spawn_crawl, AnswerRecord, CrawlRequest};
use std::time::Instant;

use crate::error::ApiError;
use crate::router::AppState;

#[derive(Debug, Deserialize)]
pub struct CrawlBody {
    pub start_url: String,
    pub max_pages: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AskBody {
    pub question: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusMessage {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IndexResponse {
    pub status: String,
    pub vector_count: usize,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Website RAG service is running." }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Validate the request and start the crawl in the background.
pub async fn crawl(
    State(state): State<AppState>,
    Json(body): Json<CrawlBody>,
) -> Result<Json<StatusMessage>, ApiError> {
    let max_pages = body.max_pages.unwrap_or(state.config.crawl.max_pages);
    let request = CrawlRequest::parse(&body.start_url, max_pages)?;
    let message = format!(
        "Crawling started for {}. This will run in the background.",
        request.start_url
    );

    spawn_crawl(state.crawler.clone(), request);

    Ok(Json(StatusMessage {
        status: "success".to_string(),
        message,
    }))
}

/// Rebuild the collection and report how many fragments it now holds.
pub async fn index(State(state): State<AppState>) -> Result<Json<IndexResponse>, ApiError> {
    let report = state.indexer.run().await?;

    Ok(Json(IndexResponse {
        status: "success".to_string(),
        vector_count: report.fragment_count,
    }))
}

/// Answer a question. `total_ms` spans this handler, not just the engine.
pub async fn ask(
    State(state): State<AppState>,
    Json(body): Json<AskBody>,
) -> Result<Json<AnswerRecord>, ApiError> {
    let start = Instant::now();
    let top_k = body.top_k.unwrap_or(state.config.ask.default_top_k);

    let grounded = state.qa.respond(&body.question, top_k).await?;
    let record = grounded.finish(start.elapsed());

    tracing::info!(
        sources = record.sources.len(),
        retrieval_ms = record.timings.retrieval_ms,
        generation_ms = record.timings.generation_ms,
        total_ms = record.timings.total_ms,
        "Answered question"
    );

    Ok(Json(record))
}
