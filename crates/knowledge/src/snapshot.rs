//! The crawl snapshot: a JSON object mapping page URL to extracted text.
//!
//! Key order is preserved on both load and save, so document sequence numbers
//! (and therefore fragment ids) follow crawl order.

use crate::types::Document;
use serde_json::{Map, Value};
use siteqa_core::{AppError, AppResult};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Ordered set of crawled documents, unique by URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSnapshot {
    documents: Vec<Document>,
}

impl CrawlSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a page. Returns false (and keeps the first text) when the URL
    /// is already present.
    pub fn insert(&mut self, url: impl Into<String>, text: impl Into<String>) -> bool {
        let url = url.into();
        if self.contains(&url) {
            return false;
        }
        self.documents.push(Document::new(url, text));
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.documents.iter().any(|d| d.url == url)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }

    /// Parse a snapshot from its JSON form.
    ///
    /// # Errors
    /// Returns `AppError::DataSourceUnavailable` unless the input is a JSON
    /// object whose values are all strings.
    pub fn from_json(json: &str) -> AppResult<Self> {
        let map: Map<String, Value> = serde_json::from_str(json).map_err(|e| {
            AppError::DataSourceUnavailable(format!(
                "Crawl snapshot is not a URL-to-text mapping: {}",
                e
            ))
        })?;

        let mut snapshot = Self::new();
        for (url, value) in map {
            let text = match value {
                Value::String(text) => text,
                other => {
                    return Err(AppError::DataSourceUnavailable(format!(
                        "Crawl snapshot entry '{}' is not text (found {})",
                        url,
                        json_kind(&other)
                    )))
                }
            };
            snapshot.insert(url, text);
        }

        Ok(snapshot)
    }

    /// Serialize as a pretty-printed JSON object.
    pub fn to_json(&self) -> AppResult<String> {
        let map: Map<String, Value> = self
            .documents
            .iter()
            .map(|d| (d.url.clone(), Value::String(d.text.clone())))
            .collect();
        Ok(serde_json::to_string_pretty(&Value::Object(map))?)
    }

    /// Load a snapshot from disk.
    ///
    /// # Errors
    /// Returns `AppError::DataSourceUnavailable` when the file is missing,
    /// unreadable or malformed.
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::DataSourceUnavailable(format!(
                "Crawl snapshot {:?} could not be read: {}",
                path, e
            ))
        })?;

        let snapshot = Self::from_json(&contents).map_err(|e| match e {
            AppError::DataSourceUnavailable(msg) => {
                AppError::DataSourceUnavailable(format!("{:?}: {}", path, msg))
            }
            other => other,
        })?;

        tracing::debug!("Loaded {} documents from {:?}", snapshot.len(), path);
        Ok(snapshot)
    }

    /// Write the snapshot to `path`, replacing any previous file atomically.
    ///
    /// Each call stages into its own temp file next to `path`, so concurrent
    /// saves never share a partial file; the last rename wins.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(self.to_json()?.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| AppError::Io(e.error))?;

        tracing::info!("Wrote {} documents to {:?}", self.len(), path);
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_order_preserved_through_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data/url_to_doc.json");

        let mut snapshot = CrawlSnapshot::new();
        snapshot.insert("https://a.test/zeta", "last letter first");
        snapshot.insert("https://a.test/alpha", "first letter second");
        snapshot.insert("https://a.test/mid", "");
        snapshot.save(&path).unwrap();

        let loaded = CrawlSnapshot::load(&path).unwrap();
        let urls: Vec<&str> = loaded.documents().iter().map(|d| d.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://a.test/zeta", "https://a.test/alpha", "https://a.test/mid"]
        );
        assert_eq!(loaded, snapshot);
        let leftovers = std::fs::read_dir(temp.path().join("data")).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_duplicate_url_keeps_first() {
        let mut snapshot = CrawlSnapshot::new();
        assert!(snapshot.insert("https://a.test/", "one"));
        assert!(!snapshot.insert("https://a.test/", "two"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.documents()[0].text, "one");
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = CrawlSnapshot::load(&temp.path().join("absent.json"));
        assert!(matches!(result, Err(AppError::DataSourceUnavailable(_))));
    }

    #[test]
    fn test_malformed_inputs() {
        for bad in ["not json", "[\"a\", \"b\"]", "{\"https://a.test/\": 3}"] {
            assert!(
                matches!(
                    CrawlSnapshot::from_json(bad),
                    Err(AppError::DataSourceUnavailable(_))
                ),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_empty_object() {
        assert!(CrawlSnapshot::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_saves_all_succeed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data/url_to_doc.json");

        let handles: Vec<_> = (0..4)
            .map(|writer| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let mut snapshot = CrawlSnapshot::new();
                    for page in 0..2_000 {
                        snapshot.insert(
                            format!("https://a.test/{}/{}", writer, page),
                            "x".repeat(100),
                        );
                    }
                    for _ in 0..10 {
                        snapshot.save(&path)?;
                    }
                    Ok::<_, AppError>(snapshot)
                })
            })
            .collect();

        let written: Vec<CrawlSnapshot> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        let loaded = CrawlSnapshot::load(&path).unwrap();
        assert!(written.contains(&loaded));
        let leftovers = std::fs::read_dir(temp.path().join("data")).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
