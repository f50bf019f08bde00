use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the seed `*.sql` files.
    #[serde(default = "default_corpus_dir")]
    pub corpus_dir: PathBuf,

    /// Directory the downloaded photos are stored in.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Generated update artifact.
    #[serde(default = "default_output_sql")]
    pub output_sql: PathBuf,

    #[serde(default)]
    pub corpus: CorpusConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub fetcher: FetcherConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// File names inside `corpus_dir` that are never read as input.
    /// The output artifact is always excluded on top of these.
    #[serde(default = "default_corpus_exclude")]
    pub exclude: Vec<String>,
}

fn default_corpus_exclude() -> Vec<String> {
    vec!["05-photo-updates.sql".to_string()]
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            exclude: default_corpus_exclude(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_foreign_endpoint")]
    pub foreign_endpoint: String,

    #[serde(default = "default_local_endpoint")]
    pub local_endpoint: String,

    /// Width requested from the search API for the page thumbnail.
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,

    /// Width the thumbnail URL is rewritten to before download.
    #[serde(default = "default_full_width")]
    pub full_width: u32,

    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Use the curated local-name to foreign-title table shipped with the binary.
    #[serde(default = "default_builtin_overrides")]
    pub builtin_overrides: bool,

    /// Extra overrides, replacing built-in entries with the same key.
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

fn default_foreign_endpoint() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_local_endpoint() -> String {
    "https://ru.wikipedia.org/w/api.php".to_string()
}

fn default_thumbnail_size() -> u32 {
    500
}

fn default_full_width() -> u32 {
    800
}

fn default_search_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!(
        "seed-photos/{} (historical timeline map seed data)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_builtin_overrides() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            foreign_endpoint: default_foreign_endpoint(),
            local_endpoint: default_local_endpoint(),
            thumbnail_size: default_thumbnail_size(),
            full_width: default_full_width(),
            timeout_secs: default_search_timeout_secs(),
            user_agent: default_user_agent(),
            builtin_overrides: default_builtin_overrides(),
            overrides: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    #[serde(default = "default_download_timeout_secs")]
    pub timeout_secs: u64,

    /// Payloads smaller than this are treated as error pages and discarded.
    #[serde(default = "default_min_bytes")]
    pub min_bytes: u64,
}

fn default_download_timeout_secs() -> u64 {
    30
}

fn default_min_bytes() -> u64 {
    1000
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_download_timeout_secs(),
            min_bytes: default_min_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pause after every descriptor that contacted the search service.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    500
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_name_column")]
    pub name_column: String,

    #[serde(default = "default_photo_column")]
    pub photo_column: String,

    /// Photo reference of rows nobody has curated yet.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Public path prefix the catalog serves `upload_dir` under.
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
}

fn default_table() -> String {
    "persons".to_string()
}

fn default_name_column() -> String {
    "name".to_string()
}

fn default_photo_column() -> String {
    "main_photo_url".to_string()
}

fn default_placeholder() -> String {
    "/uploads/seed/default.jpg".to_string()
}

fn default_path_prefix() -> String {
    "/uploads/seed".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            name_column: default_name_column(),
            photo_column: default_photo_column(),
            placeholder: default_placeholder(),
            path_prefix: default_path_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `SEED_PHOTOS_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write a daily rolling log file here.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Send events to systemd-journald when available (Linux only).
    #[serde(default)]
    pub journald: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
            journald: false,
        }
    }
}

fn default_corpus_dir() -> PathBuf {
    PathBuf::from("init-db")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("backend").join("uploads").join("seed")
}

fn default_output_sql() -> PathBuf {
    default_corpus_dir().join("05-photo-updates.sql")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_dir: default_corpus_dir(),
            upload_dir: default_upload_dir(),
            output_sql: default_output_sql(),
            corpus: CorpusConfig::default(),
            resolver: ResolverConfig::default(),
            fetcher: FetcherConfig::default(),
            pipeline: PipelineConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load from `SEED_PHOTOS_CONFIG` or the user config directory,
    /// falling back to defaults when neither file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;

        Ok(())
    }

    /// File names the extractor must skip: the configured list plus the
    /// artifact this tool writes.
    pub fn excluded_corpora(&self) -> Vec<String> {
        let mut excluded = self.corpus.exclude.clone();
        if let Some(name) = self.output_sql.file_name() {
            let name = name.to_string_lossy().to_string();
            if !excluded.contains(&name) {
                excluded.push(name);
            }
        }
        excluded
    }

    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("SEED_PHOTOS_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("seed-photos")
            .join("config.toml")
    }
}
