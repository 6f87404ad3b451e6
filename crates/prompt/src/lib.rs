//! Prompt system for SiteQA.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions (optional workspace overrides)
//! - The built-in grounded question-answering template
//! - Handlebars template rendering

pub mod builder;
pub mod grounded;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use grounded::{
    grounded_qa_definition, FALLBACK_ANSWER, GROUNDED_QA_PROMPT_ID, VAR_CONTEXT, VAR_FALLBACK,
    VAR_QUESTION,
};
pub use loader::{load_prompt, load_prompt_or_default};
pub use types::{BuiltPrompt, PromptDefinition};
