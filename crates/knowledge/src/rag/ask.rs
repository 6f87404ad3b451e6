//! RAG answering orchestration.
//!
//! Retrieves relevant fragments and generates a grounded answer via the LLM.

use crate::rag::sources::assemble_sources;
use crate::rag::types::{millis, AnswerRecord, GroundedAnswer, StageTimings};
use crate::types::ScoredFragment;
use crate::vector_index::VectorIndex;
use siteqa_core::{AppError, AppResult};
use siteqa_llm::{LlmClient, LlmRequest};
use siteqa_prompt::{
    build_prompt, grounded_qa_definition, PromptDefinition, FALLBACK_ANSWER, VAR_CONTEXT,
    VAR_FALLBACK, VAR_QUESTION,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Answer returned in place of model output when generation fails or times out.
pub const GENERATION_ERROR_ANSWER: &str = "Error generating response from the model.";

const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Question-answering engine over one vector collection.
pub struct QaEngine {
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    temperature: Option<f32>,
    generation_timeout: Duration,
}

impl QaEngine {
    /// Engine using the built-in grounded prompt and a 120s generation timeout.
    pub fn new(index: Arc<dyn VectorIndex>, llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            index,
            llm,
            model: model.into(),
            prompt: grounded_qa_definition(),
            temperature: None,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    pub fn with_prompt(mut self, prompt: PromptDefinition) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Answer `question` from the `top_k` nearest fragments, measuring the
    /// total from entry to return.
    pub async fn answer_question(&self, question: &str, top_k: usize) -> AppResult<AnswerRecord> {
        let start = Instant::now();
        let grounded = self.respond(question, top_k).await?;
        Ok(grounded.finish(start.elapsed()))
    }

    /// Run retrieval and generation, leaving the total to the caller.
    ///
    /// # Errors
    /// `AppError::InvalidInput` for a blank question or `top_k == 0`, and
    /// whatever the vector index reports when retrieval fails. Generation
    /// failures are not errors: they produce [`GENERATION_ERROR_ANSWER`].
    #[tracing::instrument(skip(self), fields(collection = %self.index.collection_name()))]
    pub async fn respond(&self, question: &str, top_k: usize) -> AppResult<GroundedAnswer> {
        if question.trim().is_empty() {
            return Err(AppError::InvalidInput("question must not be empty".to_string()));
        }
        if top_k == 0 {
            return Err(AppError::InvalidInput("top_k must be at least 1".to_string()));
        }

        let retrieval_start = Instant::now();
        let hits = self.index.query(question, top_k).await.map_err(|e| {
            tracing::error!("Retrieval failed: {}", e);
            e
        })?;
        let retrieval_ms = millis(retrieval_start.elapsed());

        tracing::info!(
            "Retrieved {} fragments (requested top-{}) in {}ms",
            hits.len(),
            top_k,
            retrieval_ms
        );

        let prompt = self.render_prompt(question, &hits)?;

        let generation_start = Instant::now();
        let (answer, generation_failed) = match self.generate(prompt).await {
            Ok(answer) => (answer, false),
            Err(e) => {
                tracing::warn!("Generation failed, returning degraded answer: {}", e);
                (GENERATION_ERROR_ANSWER.to_string(), true)
            }
        };
        let generation_ms = millis(generation_start.elapsed());

        Ok(GroundedAnswer {
            answer,
            sources: assemble_sources(&hits),
            stage_timings: StageTimings {
                retrieval_ms,
                generation_ms,
            },
            generation_failed,
        })
    }

    fn render_prompt(&self, question: &str, hits: &[ScoredFragment]) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert(VAR_CONTEXT.to_string(), build_context(hits));
        variables.insert(VAR_QUESTION.to_string(), question.to_string());
        variables.insert(VAR_FALLBACK.to_string(), FALLBACK_ANSWER.to_string());

        Ok(build_prompt(&self.prompt, variables)?.user)
    }

    async fn generate(&self, prompt: String) -> AppResult<String> {
        let mut request = LlmRequest::new(prompt, self.model.as_str());
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        match tokio::time::timeout(self.generation_timeout, self.llm.complete(&request)).await {
            Ok(Ok(response)) => {
                tracing::debug!(
                    model = %response.model,
                    prompt_tokens = response.usage.prompt_tokens,
                    completion_tokens = response.usage.completion_tokens,
                    "Generation finished"
                );
                Ok(response.content.trim().to_string())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AppError::Generation(format!(
                "{} did not respond within {}s",
                self.llm.provider_name(),
                self.generation_timeout.as_secs_f64()
            ))),
        }
    }
}

/// Fragment texts in retrieval order, separated by a blank line.
fn build_context(hits: &[ScoredFragment]) -> String {
    hits.iter()
        .map(|hit| hit.fragment.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
