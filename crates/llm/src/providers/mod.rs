//! Concrete completion providers.

pub mod ollama;

pub use ollama::OllamaClient;
