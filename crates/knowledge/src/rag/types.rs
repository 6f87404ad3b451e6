//! RAG response types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A page cited by an answer.
///
/// `snippet` is the full text of the best-ranked fragment from that page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    pub snippet: String,
}

/// Wall-clock milliseconds for each stage of a request.
///
/// A stage that ran reports at least 1 ms, so a sub-millisecond retrieval
/// still shows as non-zero. Zero means the stage did not run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    pub retrieval_ms: u64,
    pub generation_ms: u64,

    /// Measured at the request boundary, not summed from the stages
    pub total_ms: u64,
}

/// Stage timings known to the engine; the total is added by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub retrieval_ms: u64,
    pub generation_ms: u64,
}

impl StageTimings {
    pub fn finish(self, total: Duration) -> Timings {
        Timings {
            retrieval_ms: self.retrieval_ms,
            generation_ms: self.generation_ms,
            total_ms: millis(total),
        }
    }
}

/// What the engine produces before the request boundary closes.
#[derive(Debug, Clone)]
pub struct GroundedAnswer {
    pub answer: String,
    pub sources: Vec<Source>,
    pub stage_timings: StageTimings,

    /// Whether `answer` is the degraded generation-error sentence
    pub generation_failed: bool,
}

impl GroundedAnswer {
    /// Close the request with its independently measured total duration.
    pub fn finish(self, total: Duration) -> AnswerRecord {
        AnswerRecord {
            answer: self.answer,
            sources: self.sources,
            timings: self.stage_timings.finish(total),
        }
    }
}

/// Answer returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub answer: String,
    pub sources: Vec<Source>,
    pub timings: Timings,
}

/// Duration in whole milliseconds, rounded to nearest; any non-zero
/// duration is at least 1.
pub fn millis(duration: Duration) -> u64 {
    if duration.is_zero() {
        return 0;
    }
    ((duration.as_secs_f64() * 1000.0).round() as u64).max(1)
}
