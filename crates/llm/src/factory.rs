//! LLM provider factory.
//!
//! Builds the completion client named in the configuration. The client is
//! created once at startup and shared behind an `Arc`.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use siteqa_core::config::LlmSettings;
use siteqa_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client from the completion settings.
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or the HTTP client
/// cannot be built.
pub fn create_client(settings: &LlmSettings) -> AppResult<Arc<dyn LlmClient>> {
    match settings.provider.to_lowercase().as_str() {
        "ollama" => {
            let client = OllamaClient::with_timeout(
                &settings.endpoint,
                Duration::from_secs(settings.timeout_secs),
            )?;
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown LLM provider: {}",
            settings.provider
        ))),
    }
}
