//! RAG (Retrieval-Augmented Generation) answering system.
//!
//! Retrieves the fragments nearest to a question, asks the completion model
//! for an answer grounded in them, and reports sources and stage timings.

pub mod ask;
pub mod sources;
pub mod types;

pub use ask::{QaEngine, GENERATION_ERROR_ANSWER};
pub use sources::assemble_sources;
pub use types::{AnswerRecord, GroundedAnswer, Source, StageTimings, Timings};
