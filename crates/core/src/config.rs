//! Configuration management for SiteQA.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config files (`.siteqa/config.yaml` or `SITEQA_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Relative data paths are resolved against the workspace directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Embedding providers the knowledge crate can construct.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Completion providers the llm crate can construct.
pub const KNOWN_LLM_PROVIDERS: [&str; 1] = ["ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .siteqa/ and data/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Persisted state locations
    pub data: DataConfig,

    /// Chunker knobs
    pub chunking: ChunkingConfig,

    /// Indexing pipeline knobs
    pub indexing: IndexingConfig,

    /// Embedding capability
    pub embedding: EmbeddingSettings,

    /// Completion capability
    pub llm: LlmSettings,

    /// Crawler defaults
    pub crawl: CrawlSettings,

    /// HTTP surface
    pub server: ServerConfig,

    /// Question answering defaults
    pub ask: AskConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON records
    pub log_json: bool,
}

/// Where the crawl snapshot and the vector collection live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DataConfig {
    pub snapshot_path: PathBuf,
    pub vector_db_path: PathBuf,
    pub collection: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("data/url_to_doc.json"),
            vector_db_path: PathBuf::from("data/vector_db"),
            collection: "website_content".to_string(),
        }
    }
}

/// Fixed-window chunking parameters, measured in characters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ChunkingConfig {
    /// Window length
    pub size: usize,

    /// Characters shared with the previous window
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            size: 800,
            overlap: 100,
        }
    }
}

impl ChunkingConfig {
    pub fn new(size: usize, overlap: usize) -> AppResult<Self> {
        let config = Self { size, overlap };
        config.validate()?;
        Ok(config)
    }

    /// Reject parameters that would make the window stride non-positive.
    pub fn validate(&self) -> AppResult<()> {
        if self.size == 0 {
            return Err(AppError::Config(
                "Chunk size must be greater than zero".to_string(),
            ));
        }

        if self.overlap >= self.size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.overlap, self.size
            )));
        }

        Ok(())
    }

    /// Distance between the starts of consecutive windows. Zero for a
    /// configuration that [`ChunkingConfig::validate`] rejects.
    pub fn stride(&self) -> usize {
        self.size.saturating_sub(self.overlap)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexingConfig {
    /// Fragments written per vector index request
    pub batch_size: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self { batch_size: 100 }
    }
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingSettings {
    /// Provider name: "trigram" (offline) or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Custom endpoint for HTTP providers
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

/// Completion provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmSettings {
    pub provider: String,
    pub model: String,
    pub endpoint: String,

    /// Upper bound on a single completion call
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(), // Local-first default
            model: "llama3:8b".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            timeout_secs: 120,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlSettings {
    /// Default hard cap on pages visited per crawl
    pub max_pages: usize,

    /// Per-page fetch timeout
    pub request_timeout_secs: u64,

    pub user_agent: String,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_pages: 30,
            request_timeout_secs: 20,
            user_agent: format!("siteqa-crawler/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AskConfig {
    pub default_top_k: usize,
}

impl Default for AskConfig {
    fn default() -> Self {
        Self { default_top_k: 5 }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    workspace: Option<WorkspaceSection>,
    data: Option<DataConfig>,
    chunking: Option<ChunkingConfig>,
    indexing: Option<IndexingConfig>,
    embedding: Option<EmbeddingSettings>,
    llm: Option<LlmSettings>,
    crawl: Option<CrawlSettings>,
    server: Option<ServerConfig>,
    ask: Option<AskConfig>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            data: DataConfig::default(),
            chunking: ChunkingConfig::default(),
            indexing: IndexingConfig::default(),
            embedding: EmbeddingSettings::default(),
            llm: LlmSettings::default(),
            crawl: CrawlSettings::default(),
            server: ServerConfig::default(),
            ask: AskConfig::default(),
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `SITEQA_WORKSPACE`: Override workspace path
    /// - `SITEQA_CONFIG`: Path to config file
    /// - `SITEQA_LLM_PROVIDER`, `SITEQA_LLM_MODEL`, `SITEQA_LLM_ENDPOINT`
    /// - `SITEQA_EMBEDDING_PROVIDER`
    /// - `SITEQA_BIND`: HTTP bind address
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], but an explicit workspace or config file
    /// decides which YAML file is read.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        match workspace {
            Some(workspace) => config.workspace = workspace,
            None => {
                if let Ok(workspace) = std::env::var("SITEQA_WORKSPACE") {
                    config.workspace = PathBuf::from(workspace);
                }
            }
        }

        match config_file {
            Some(config_file) => config.config_file = Some(config_file),
            None => {
                if let Ok(config_file) = std::env::var("SITEQA_CONFIG") {
                    config.config_file = Some(PathBuf::from(config_file));
                }
            }
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.siteqa_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("SITEQA_LLM_PROVIDER") {
            config.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("SITEQA_LLM_MODEL") {
            config.llm.model = model;
        }

        if let Ok(endpoint) = std::env::var("SITEQA_LLM_ENDPOINT") {
            config.llm.endpoint = endpoint;
        }

        if let Ok(provider) = std::env::var("SITEQA_EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }

        if let Ok(bind) = std::env::var("SITEQA_BIND") {
            config.server.bind = bind;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    ///
    /// Sections present in the file replace the corresponding defaults; keys
    /// missing inside a section keep their default values.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        if let Some(data) = file.data {
            result.data = data;
        }
        if let Some(chunking) = file.chunking {
            result.chunking = chunking;
        }
        if let Some(indexing) = file.indexing {
            result.indexing = indexing;
        }
        if let Some(embedding) = file.embedding {
            result.embedding = embedding;
        }
        if let Some(llm) = file.llm {
            result.llm = llm;
        }
        if let Some(crawl) = file.crawl {
            result.crawl = crawl;
        }
        if let Some(server) = file.server {
            result.server = server;
        }
        if let Some(ask) = file.ask {
            result.ask = ask;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the YAML file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        llm_provider: Option<String>,
        llm_model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = llm_provider {
            self.llm.provider = provider;
        }

        if let Some(model) = llm_model {
            self.llm.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .siteqa directory.
    pub fn siteqa_dir(&self) -> PathBuf {
        self.workspace.join(".siteqa")
    }

    /// Absolute location of the crawl snapshot.
    pub fn snapshot_path(&self) -> PathBuf {
        self.resolve(&self.data.snapshot_path)
    }

    /// Absolute location of the on-disk vector database.
    pub fn vector_db_path(&self) -> PathBuf {
        self.resolve(&self.data.vector_db_path)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Validate the whole configuration before any work begins.
    pub fn validate(&self) -> AppResult<()> {
        self.chunking.validate()?;

        if self.indexing.batch_size == 0 {
            return Err(AppError::Config(
                "Indexing batch size must be greater than zero".to_string(),
            ));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if !KNOWN_LLM_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        if self.data.collection.trim().is_empty() {
            return Err(AppError::Config(
                "Collection name cannot be empty".to_string(),
            ));
        }

        if self.crawl.max_pages == 0 {
            return Err(AppError::Config(
                "crawl.maxPages must be greater than zero".to_string(),
            ));
        }

        if self.ask.default_top_k == 0 {
            return Err(AppError::Config(
                "ask.defaultTopK must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
