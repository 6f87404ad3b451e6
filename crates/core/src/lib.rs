//! SiteQA Core Library
//!
//! This crate provides the foundational utilities shared by every SiteQA crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (defaults, YAML, environment, CLI overrides)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, ChunkingConfig};
pub use error::{AppError, AppResult};
