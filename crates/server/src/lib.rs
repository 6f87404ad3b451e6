//! HTTP surface for SiteQA.
//!
//! A thin axum adapter over [`siteqa_knowledge::Services`]:
//! - `POST /crawl` starts a background crawl
//! - `POST /index` rebuilds the vector collection from the crawl snapshot
//! - `POST /ask` answers a question with sources and timings

pub mod error;
pub mod handlers;
pub mod router;

pub use error::ApiError;
pub use router::{router, AppState};

use siteqa_core::{AppError, AppResult};
use siteqa_knowledge::Services;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(services: Services, addr: &str) -> AppResult<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    let local = listener.local_addr()?;
    tracing::info!("Listening on http://{}", local);

    axum::serve(listener, router(Arc::new(services)))
        .await
        .map_err(AppError::Io)
}
