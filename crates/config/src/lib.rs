//! Configuration loading, validation, and management for Concierge.
//!
//! Loads configuration from `~/.concierge/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.concierge/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the reasoning model (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Routing and orchestration settings
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Long-term memory service
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Capability adapter credentials and defaults
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_provider() -> String {
    "cerebras".into()
}
fn default_model() -> String {
    "gpt-oss-120b".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    512
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("providers", &self.providers)
            .field("routing", &self.routing)
            .field("memory", &self.memory)
            .field("tools", &self.tools)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// User id used when the caller supplies none
    #[serde(default = "default_identity")]
    pub default_user_id: String,

    /// Thread id used when the caller supplies none
    #[serde(default = "default_identity")]
    pub default_thread_id: String,

    /// Ask the model once more before falling back to `respond`
    #[serde(default)]
    pub retry_invalid: bool,

    /// Supervisor visits allowed per message
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,

    /// Reasoning iterations allowed per specialist turn
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: u32,

    /// Name the assistant introduces itself with
    #[serde(default = "default_persona")]
    pub persona: String,
}

fn default_identity() -> String {
    "samantha".into()
}
fn default_max_hops() -> u32 {
    4
}
fn default_max_tool_iterations() -> u32 {
    10
}
fn default_persona() -> String {
    "Samantha".into()
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_user_id: default_identity(),
            default_thread_id: default_identity(),
            retry_invalid: false,
            max_hops: default_max_hops(),
            max_tool_iterations: default_max_tool_iterations(),
            persona: default_persona(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// "mem0", "in_memory" or "none"
    #[serde(default = "default_memory_backend")]
    pub backend: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_memory_url")]
    pub api_url: String,

    /// Search API version sent with every query
    #[serde(default = "default_search_version")]
    pub search_version: String,

    /// Result bound for "everything you remember" listings
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

fn default_memory_backend() -> String {
    "mem0".into()
}
fn default_memory_url() -> String {
    "https://api.mem0.ai".into()
}
fn default_search_version() -> String {
    "v2".into()
}
fn default_list_limit() -> usize {
    50
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            api_key: None,
            api_url: default_memory_url(),
            search_version: default_search_version(),
            list_limit: default_list_limit(),
        }
    }
}

impl std::fmt::Debug for MemoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConfig")
            .field("backend", &self.backend)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("search_version", &self.search_version)
            .field("list_limit", &self.list_limit)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Google Flights/Hotels/Shopping/Jobs/recipes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serpapi_api_key: Option<String>,

    /// Web search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tavily_api_key: Option<String>,

    /// Weather
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openweather_api_key: Option<String>,

    /// Stock quotes and company overviews
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alphavantage_api_key: Option<String>,

    /// Currency for flight and hotel prices
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Directory of .md/.txt documents for the knowledge base
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_dir: Option<PathBuf>,

    /// Per-request timeout for adapter HTTP calls
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

fn default_currency() -> String {
    "INR".into()
}
fn default_http_timeout() -> u64 {
    30
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            serpapi_api_key: None,
            tavily_api_key: None,
            openweather_api_key: None,
            alphavantage_api_key: None,
            currency: default_currency(),
            knowledge_dir: None,
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl std::fmt::Debug for ToolsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolsConfig")
            .field("serpapi_api_key", &redact(&self.serpapi_api_key))
            .field("tavily_api_key", &redact(&self.tavily_api_key))
            .field("openweather_api_key", &redact(&self.openweather_api_key))
            .field("alphavantage_api_key", &redact(&self.alphavantage_api_key))
            .field("currency", &self.currency)
            .field("knowledge_dir", &self.knowledge_dir)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

/// Known memory backends.
pub const MEMORY_BACKENDS: [&str; 3] = ["mem0", "in_memory", "none"];

impl AppConfig {
    /// Load configuration from the default path (~/.concierge/config.toml).
    ///
    /// Environment variables fill in whatever the file leaves unset:
    /// - `CONCIERGE_API_KEY`, `CEREBRAS_API_KEY`, `OPENAI_API_KEY` (model key)
    /// - `CONCIERGE_PROVIDER`, `CONCIERGE_MODEL` (always override)
    /// - `MEM0_API_KEY`, `SERPAPI_API_KEY`, `TAVILY_API_KEY`,
    ///   `OPENWEATHER_API_KEY`, `ALPHAVANTAGE_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Fill unset secrets and override provider/model from an env lookup.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = env("CONCIERGE_API_KEY")
                .or_else(|| env("CEREBRAS_API_KEY"))
                .or_else(|| env("OPENAI_API_KEY"));
        }
        if let Some(provider) = env("CONCIERGE_PROVIDER") {
            self.default_provider = provider;
        }
        if let Some(model) = env("CONCIERGE_MODEL") {
            self.default_model = model;
        }

        fill(&mut self.memory.api_key, env("MEM0_API_KEY"));
        fill(&mut self.tools.serpapi_api_key, env("SERPAPI_API_KEY"));
        fill(&mut self.tools.tavily_api_key, env("TAVILY_API_KEY"));
        fill(&mut self.tools.openweather_api_key, env("OPENWEATHER_API_KEY"));
        fill(&mut self.tools.alphavantage_api_key, env("ALPHAVANTAGE_API_KEY"));
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".concierge")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.default_max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "default_max_tokens must be > 0".into(),
            ));
        }

        if self.routing.max_tool_iterations == 0 || self.routing.max_hops == 0 {
            return Err(ConfigError::ValidationError(
                "routing.max_tool_iterations and routing.max_hops must be > 0".into(),
            ));
        }

        if !MEMORY_BACKENDS.contains(&self.memory.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "memory.backend must be one of {MEMORY_BACKENDS:?}, got '{}'",
                self.memory.backend
            )));
        }

        Ok(())
    }

    /// Check if a model API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// A copy with every secret replaced, safe to print.
    pub fn redacted(&self) -> Self {
        let hide = |s: &Option<String>| s.as_ref().map(|_| "[REDACTED]".to_string());
        let mut config = self.clone();
        config.api_key = hide(&self.api_key);
        for provider in config.providers.values_mut() {
            provider.api_key = hide(&provider.api_key);
        }
        config.memory.api_key = hide(&self.memory.api_key);
        config.tools.serpapi_api_key = hide(&self.tools.serpapi_api_key);
        config.tools.tavily_api_key = hide(&self.tools.tavily_api_key);
        config.tools.openweather_api_key = hide(&self.tools.openweather_api_key);
        config.tools.alphavantage_api_key = hide(&self.tools.alphavantage_api_key);
        config
    }

    /// Generate a default config TOML string (for `config init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value;
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            providers: HashMap::new(),
            routing: RoutingConfig::default(),
            memory: MemoryConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
