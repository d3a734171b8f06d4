//! Wayfarer configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main Wayfarer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Trip planning pipeline configuration
    pub pipeline: PipelineConfig,

    /// Photo search configuration
    pub photos: PhotosConfig,

    /// Feed aggregation configuration
    pub feeds: FeedsConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that required environment variables and endpoints are set.
    /// Call this before running the trip pipeline to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        self.feeds.validate()
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .wayfarer.yml
        let local_config = PathBuf::from(".wayfarer.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/wayfarer/wayfarer.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("wayfarer").join("wayfarer.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed: the full load reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai"-compatible endpoints are supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL (the chat-completions path is appended)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// HTTP request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "LLM_API_KEY".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            max_tokens: 8192,
            timeout_ms: 120_000,
        }
    }
}

/// Trip planning pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Hard ceiling for one stage call in milliseconds
    #[serde(rename = "stage-timeout-ms")]
    pub stage_timeout_ms: u64,

    /// Max tokens for the lookup stages (attractions, weather, hotels)
    #[serde(rename = "stage-max-tokens")]
    pub stage_max_tokens: u32,

    /// Max tokens for the itinerary synthesis stage
    #[serde(rename = "planner-max-tokens")]
    pub planner_max_tokens: u32,

    /// Directory with `.pmt` prompt overrides
    #[serde(rename = "prompts-dir")]
    pub prompts_dir: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_millis(self.stage_timeout_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_timeout_ms: 180_000,
            stage_max_tokens: 4096,
            planner_max_tokens: 8192,
            prompts_dir: None,
        }
    }
}

/// Photo search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotosConfig {
    /// Backfill attraction images after planning
    pub enabled: bool,

    /// Photo search API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable containing the access key
    #[serde(rename = "access-key-env")]
    pub access_key_env: String,

    /// Number of images requested per attraction
    #[serde(rename = "images-per-attraction")]
    pub images_per_attraction: usize,

    /// Concurrent photo searches during backfill
    pub concurrency: usize,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Translate attraction names to English before searching
    pub translate: bool,
}

impl PhotosConfig {
    pub fn access_key(&self) -> Option<String> {
        std::env::var(&self.access_key_env).ok().filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.unsplash.com".to_string(),
            access_key_env: "UNSPLASH_ACCESS_KEY".to_string(),
            images_per_attraction: 5,
            concurrency: 4,
            timeout_ms: 10_000,
            translate: true,
        }
    }
}

/// Feed aggregation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    /// Feed endpoints in priority order (primary first)
    pub endpoints: Vec<String>,

    /// Path between the endpoint base and the source id
    #[serde(rename = "route-prefix")]
    pub route_prefix: String,

    /// Per-source fetch timeout in milliseconds
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Health probe timeout in milliseconds
    #[serde(rename = "health-timeout-ms")]
    pub health_timeout_ms: u64,

    /// Minimum spacing between request starts against one endpoint
    #[serde(rename = "request-spacing-ms")]
    pub request_spacing_ms: u64,

    /// Concurrent source fetches per pass
    pub concurrency: usize,

    /// Entries read from each source feed
    #[serde(rename = "max-entries-per-source")]
    pub max_entries_per_source: usize,

    /// Records returned to the caller
    #[serde(rename = "max-results")]
    pub max_results: usize,

    /// Search page URL prefix; the percent-encoded keyword is appended
    #[serde(rename = "search-url-base")]
    pub search_url_base: String,

    /// Image proxy URL prefix; the percent-encoded image URL is appended
    #[serde(rename = "image-proxy-base")]
    pub image_proxy_base: String,
}

impl FeedsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(eyre::eyre!("feeds.endpoints must list at least one endpoint"));
        }
        if self.concurrency == 0 {
            return Err(eyre::eyre!("feeds.concurrency must be at least 1"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn request_spacing(&self) -> Duration {
        Duration::from_millis(self.request_spacing_ms)
    }
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![
                "http://localhost:1200".to_string(),
                "https://rsshub.pseudoyu.com".to_string(),
            ],
            route_prefix: "xiaohongshu/user".to_string(),
            request_timeout_ms: 30_000,
            health_timeout_ms: 5_000,
            request_spacing_ms: 500,
            concurrency: 4,
            max_entries_per_source: 10,
            max_results: 6,
            search_url_base: "https://www.xiaohongshu.com/search_result?keyword=".to_string(),
            image_proxy_base: "https://wsrv.nl/?url=".to_string(),
        }
    }
}
