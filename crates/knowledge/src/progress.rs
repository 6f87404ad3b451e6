//! Progress reporting for long-running knowledge operations.
//!
//! Indexing walks through `load`, `chunk`, `clear` and `index`; a crawl emits
//! one `crawl` event per kept page. Nothing is emitted unless a callback was
//! installed, so library callers pay only for a branch.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Stage an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Snapshot read from disk
    Load,
    /// Documents split into fragments
    Chunk,
    /// Previous generation removed from the collection
    Clear,
    /// Fragment batches written
    Index,
    /// Page fetched and kept
    Crawl,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Load => "load",
            Phase::Chunk => "chunk",
            Phase::Clear => "clear",
            Phase::Index => "index",
            Phase::Crawl => "crawl",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub phase: Phase,

    /// Units done so far: documents, fragments or pages depending on phase
    pub current: u64,

    pub total: Option<u64>,

    pub message: String,

    /// Seconds since the reporter was created
    pub elapsed_secs: f64,
}

impl ProgressEvent {
    /// Completion in percent, when the total is known.
    pub fn percentage(&self) -> Option<f64> {
        self.total.map(|total| match total {
            0 => 100.0,
            t => (self.current as f64 / t as f64) * 100.0,
        })
    }

    /// One line for a terminal, e.g. `[index] 200/450 (44%) - batch 2 written`.
    pub fn format_simple(&self) -> String {
        let progress = match self.total {
            Some(total) => format!("{}/{}", self.current, total),
            None => self.current.to_string(),
        };
        let pct = self
            .percentage()
            .map(|p| format!(" ({:.0}%)", p))
            .unwrap_or_default();

        format!("[{}] {}{} - {}", self.phase, progress, pct, self.message)
    }
}

pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Cheap to clone; clones share the callback and the start instant.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    started: Instant,
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            started: Instant::now(),
        }
    }

    /// Reporter that drops every event.
    pub fn noop() -> Self {
        Self {
            callback: None,
            started: Instant::now(),
        }
    }

    fn emit(&self, phase: Phase, current: u64, total: Option<u64>, message: String) {
        let Some(callback) = &self.callback else {
            return;
        };

        let event = ProgressEvent {
            phase,
            current,
            total,
            message,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        };
        tracing::trace!(
            phase = %event.phase,
            current = event.current,
            total = ?event.total,
            "{}",
            event.message
        );
        callback(event);
    }

    pub fn load(&self, documents: u64, path: &str) {
        self.emit(Phase::Load, documents, None, format!("documents read from {}", path));
    }

    pub fn chunk(&self, documents_done: u64, documents_total: Option<u64>, fragments_created: usize) {
        self.emit(
            Phase::Chunk,
            documents_done,
            documents_total,
            format!("{} fragments so far", fragments_created),
        );
    }

    pub fn clear(&self, removed: u64, collection: &str) {
        self.emit(Phase::Clear, removed, None, format!("removed from '{}'", collection));
    }

    pub fn index(&self, written: u64, total: Option<u64>, batch: usize) {
        self.emit(Phase::Index, written, total, format!("batch {} written", batch));
    }

    pub fn crawl(&self, pages: u64, max_pages: u64, url: &str) {
        self.emit(Phase::Crawl, pages, Some(max_pages), url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn capture() -> (ProgressReporter, Arc<Mutex<Vec<ProgressEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::new(Arc::new(move |event| {
            sink.lock().unwrap().push(event);
        }));
        (reporter, events)
    }

    #[test]
    fn test_format_with_total() {
        let (reporter, events) = capture();
        reporter.index(5, Some(10), 1);

        let line = events.lock().unwrap()[0].format_simple();
        assert_eq!(line, "[index] 5/10 (50%) - batch 1 written");
    }

    #[test]
    fn test_format_without_total() {
        let (reporter, events) = capture();
        reporter.clear(12, "website_content");

        let event = events.lock().unwrap()[0].clone();
        assert_eq!(event.percentage(), None);
        assert_eq!(event.format_simple(), "[clear] 12 - removed from 'website_content'");
    }

    #[test]
    fn test_empty_total_is_complete() {
        let (reporter, events) = capture();
        reporter.index(0, Some(0), 0);
        assert_eq!(events.lock().unwrap()[0].percentage(), Some(100.0));
    }

    #[test]
    fn test_events_in_emission_order() {
        let (reporter, events) = capture();
        reporter.load(3, "data/url_to_doc.json");
        reporter.crawl(1, 30, "https://a.test/");

        let captured = events.lock().unwrap();
        let phases: Vec<Phase> = captured.iter().map(|e| e.phase).collect();
        assert_eq!(phases, vec![Phase::Load, Phase::Crawl]);
        assert!(captured[1].elapsed_secs >= captured[0].elapsed_secs);
    }

    #[test]
    fn test_noop_reporter() {
        ProgressReporter::noop().crawl(1, 30, "https://a.test/");
    }

    #[test]
    fn test_phase_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Phase::Clear).unwrap(), "\"clear\"");
    }
}
