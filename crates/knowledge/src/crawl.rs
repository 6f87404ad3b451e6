//! Breadth-first site crawler that produces the crawl snapshot.
//!
//! The crawl stays inside the registered domain of the start URL (subdomains
//! included), visits each URL at most once, keeps only successful HTML
//! responses and stops after `max_pages` pages have been recorded.

use crate::html::parse_page;
use crate::progress::ProgressReporter;
use crate::snapshot::CrawlSnapshot;
use crate::types::CrawlReport;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use siteqa_core::config::CrawlSettings;
use siteqa_core::{AppError, AppResult};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::Instrument;
use url::{Host, Url};

/// Second-level labels that act as public suffixes under a two-letter ccTLD
/// (`example.co.uk`, `example.com.au`).
const SECOND_LEVEL_SUFFIXES: &[&str] = &["co", "com", "net", "org", "gov", "edu", "ac", "or", "ne"];

/// A validated crawl request.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub start_url: Url,
    pub max_pages: usize,
}

impl CrawlRequest {
    /// # Errors
    /// Returns `AppError::InvalidInput` unless `start_url` is an absolute
    /// http(s) URL with a host and `max_pages` is at least 1.
    pub fn parse(start_url: &str, max_pages: usize) -> AppResult<Self> {
        let url = Url::parse(start_url.trim())
            .map_err(|e| AppError::InvalidInput(format!("Invalid start URL '{}': {}", start_url, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::InvalidInput(format!(
                "Start URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.host().is_none() {
            return Err(AppError::InvalidInput(format!(
                "Start URL '{}' has no host",
                start_url
            )));
        }
        if max_pages == 0 {
            return Err(AppError::InvalidInput(
                "max_pages must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            start_url: url,
            max_pages,
        })
    }
}

/// The registered domain of a URL's host: `docs.example.com` gives
/// `example.com`, `www.example.co.uk` gives `example.co.uk`, and IP
/// addresses and single-label hosts are returned unchanged.
pub fn registered_domain(url: &Url) -> Option<String> {
    let domain = match url.host()? {
        Host::Domain(domain) => domain.trim_end_matches('.').to_ascii_lowercase(),
        Host::Ipv4(ip) => return Some(ip.to_string()),
        Host::Ipv6(ip) => return Some(ip.to_string()),
    };

    let labels: Vec<&str> = domain.split('.').collect();
    let n = labels.len();
    if n <= 2 {
        return Some(domain);
    }

    let keep = if labels[n - 1].len() == 2 && SECOND_LEVEL_SUFFIXES.contains(&labels[n - 2]) {
        3
    } else {
        2
    };
    Some(labels[n - keep..].join("."))
}

fn in_scope(url: &Url, domain: &str) -> bool {
    registered_domain(url).is_some_and(|d| d == domain)
}

/// Fetches pages and writes the crawl snapshot.
pub struct SiteCrawler {
    client: Client,
    snapshot_path: PathBuf,
    progress: ProgressReporter,
}

impl SiteCrawler {
    pub fn new(settings: &CrawlSettings, snapshot_path: impl Into<PathBuf>) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build crawler HTTP client: {}", e)))?;

        Ok(Self {
            client,
            snapshot_path: snapshot_path.into(),
            progress: ProgressReporter::noop(),
        })
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Crawl the site and replace the snapshot file with the result.
    ///
    /// Pages that fail to load are skipped, so a crawl where nothing loads
    /// still succeeds and writes an empty snapshot.
    pub async fn crawl(&self, request: &CrawlRequest) -> AppResult<CrawlReport> {
        let started_at = Utc::now();
        let snapshot = self.collect(request).await?;
        snapshot.save(&self.snapshot_path)?;

        Ok(CrawlReport {
            start_url: request.start_url.to_string(),
            pages: snapshot.len(),
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Crawl the site and return the snapshot without writing it.
    pub async fn collect(&self, request: &CrawlRequest) -> AppResult<CrawlSnapshot> {
        let domain = registered_domain(&request.start_url).ok_or_else(|| {
            AppError::InvalidInput(format!("Start URL '{}' has no host", request.start_url))
        })?;

        tracing::info!(
            "Crawling {} (domain: {}, max pages: {})",
            request.start_url,
            domain,
            request.max_pages
        );

        let mut snapshot = CrawlSnapshot::new();
        let mut queue = VecDeque::from([request.start_url.clone()]);
        let mut seen: HashSet<String> = HashSet::from([request.start_url.to_string()]);

        while let Some(url) = queue.pop_front() {
            if snapshot.len() >= request.max_pages {
                break;
            }

            let Some((final_url, body)) = self.fetch_html(&url).await else {
                continue;
            };
            if !in_scope(&final_url, &domain) {
                tracing::debug!("{} redirected off-site to {}, skipping", url, final_url);
                continue;
            }

            let page = parse_page(&body, &final_url)?;
            if !snapshot.insert(final_url.as_str(), page.text) {
                continue;
            }
            self.progress.crawl(
                snapshot.len() as u64,
                request.max_pages as u64,
                final_url.as_str(),
            );

            for link in page.links {
                if in_scope(&link, &domain) && seen.insert(link.to_string()) {
                    queue.push_back(link);
                }
            }
        }

        tracing::info!(
            "Crawl of {} finished: {} pages, {} URLs discovered",
            request.start_url,
            snapshot.len(),
            seen.len()
        );

        Ok(snapshot)
    }

    /// GET `url` and return the post-redirect URL and body of a 2xx HTML
    /// response. Anything else is logged and skipped.
    async fn fetch_html(&self, url: &Url) -> Option<(Url, String)> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Skipping {}: HTTP {}", url, response.status());
            return None;
        }

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            })
            .unwrap_or(true);
        if !is_html {
            tracing::debug!("Skipping {}: not HTML", url);
            return None;
        }

        let final_url = response.url().clone();
        match response.text().await {
            Ok(body) => Some((final_url, body)),
            Err(e) => {
                tracing::warn!("Failed to read body of {}: {}", url, e);
                None
            }
        }
    }
}

/// Run a crawl in the background. The result is only logged.
pub fn spawn_crawl(crawler: Arc<SiteCrawler>, request: CrawlRequest) -> JoinHandle<()> {
    let job_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("crawl", %job_id, start_url = %request.start_url);

    tokio::spawn(
        async move {
            match crawler.crawl(&request).await {
                Ok(report) => tracing::info!(
                    pages = report.pages,
                    "Crawl complete, snapshot written to {:?}",
                    crawler.snapshot_path()
                ),
                Err(e) => tracing::error!("Crawl failed: {}", e),
            }
        }
        .instrument(span),
    )
}
