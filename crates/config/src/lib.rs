//! Configuration loading, validation, and management for luxroute.
//!
//! Loads configuration from `~/.luxroute/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use luxroute_extract::ProtectionVocabulary;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.luxroute/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Reasoning provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Reasoning model
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub reasoner: ReasonerConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub extract: ExtractConfig,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_true() -> bool {
    true
}

/// Redact a secret string for Debug output.
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
            .field("providers", &self.providers)
            .field("reasoner", &self.reasoner)
            .field("cache", &self.cache)
            .field("router", &self.router)
            .field("catalog", &self.catalog)
            .field("extract", &self.extract)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize, Default)]
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

/// Settings for calls to the reasoning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonerConfig {
    /// Upper bound for any single call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Providers tried in order after the default one fails.
    #[serde(default)]
    pub fallback_providers: Vec<String>,

    #[serde(default = "default_classify_tokens")]
    pub classify_max_tokens: u32,

    #[serde(default = "default_filter_tokens")]
    pub filter_max_tokens: u32,

    #[serde(default = "default_compose_tokens")]
    pub compose_max_tokens: u32,

    #[serde(default = "default_relevance_tokens")]
    pub relevance_max_tokens: u32,

    #[serde(default = "default_search_term_tokens")]
    pub search_term_max_tokens: u32,
}

fn default_timeout_secs() -> u64 {
    20
}
fn default_classify_tokens() -> u32 {
    150
}
fn default_filter_tokens() -> u32 {
    300
}
fn default_compose_tokens() -> u32 {
    600
}
fn default_relevance_tokens() -> u32 {
    20
}
fn default_search_term_tokens() -> u32 {
    50
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            fallback_providers: Vec::new(),
            classify_max_tokens: default_classify_tokens(),
            filter_max_tokens: default_filter_tokens(),
            compose_max_tokens: default_compose_tokens(),
            relevance_max_tokens: default_relevance_tokens(),
            search_term_max_tokens: default_search_term_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// How often the background sweeper drops stale entries.
    #[serde(default = "default_sweep_secs")]
    pub sweep_interval_secs: u64,

    /// Characters of the lower-cased query that go into the key.
    #[serde(default = "default_key_prefix_chars")]
    pub key_prefix_chars: usize,
}

fn default_ttl_secs() -> u64 {
    300
}
fn default_sweep_secs() -> u64 {
    60
}
fn default_key_prefix_chars() -> usize {
    50
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_secs(),
            key_prefix_chars: default_key_prefix_chars(),
        }
    }
}

/// Result budgets and context handling for the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,

    /// Display budget when the query asks for cheaper products.
    #[serde(default = "default_cheap_display_limit")]
    pub cheap_display_limit: usize,

    /// Prior user turns considered for relevance.
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Relevant turns that go into the cache key.
    #[serde(default = "default_context_key_turns")]
    pub context_key_turns: usize,

    #[serde(default)]
    pub limits: QueryLimits,
}

fn default_display_limit() -> usize {
    8
}
fn default_cheap_display_limit() -> usize {
    6
}
fn default_context_window() -> usize {
    3
}
fn default_context_key_turns() -> usize {
    2
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            display_limit: default_display_limit(),
            cheap_display_limit: default_cheap_display_limit(),
            context_window: default_context_window(),
            context_key_turns: default_context_key_turns(),
            limits: QueryLimits::default(),
        }
    }
}

/// Row limits per catalog query shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLimits {
    #[serde(default = "default_type_limit")]
    pub type_query: usize,
    #[serde(default = "default_strip_limit")]
    pub led_strip: usize,
    #[serde(default = "default_protection_limit")]
    pub protection: usize,
    #[serde(default = "default_product_limit")]
    pub product_lookup: usize,
    #[serde(default = "default_text_limit")]
    pub text_search: usize,
    #[serde(default = "default_fallback_limit")]
    pub fallback: usize,
}

fn default_type_limit() -> usize {
    50
}
fn default_strip_limit() -> usize {
    20
}
fn default_protection_limit() -> usize {
    100
}
fn default_product_limit() -> usize {
    10
}
fn default_text_limit() -> usize {
    20
}
fn default_fallback_limit() -> usize {
    20
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            type_query: default_type_limit(),
            led_strip: default_strip_limit(),
            protection: default_protection_limit(),
            product_lookup: default_product_limit(),
            text_search: default_text_limit(),
            fallback: default_fallback_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// SQLite database file.
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    AppConfig::config_dir().join("catalog.db")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// Extractor tuning.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractConfig {
    /// Extra wet-room / outdoor keywords and the minimum protection class
    /// each implies, e.g. `pool = "IP68"`. Added to the built-in IP44 terms.
    #[serde(default)]
    pub protection_vocabulary: HashMap<String, String>,
}

impl ExtractConfig {
    /// The built-in vocabulary extended with the configured entries.
    pub fn protection_vocabulary(&self) -> Result<ProtectionVocabulary, ConfigError> {
        let mut entries: Vec<_> = self.protection_vocabulary.iter().collect();
        entries.sort();
        entries
            .into_iter()
            .try_fold(ProtectionVocabulary::default(), |vocab, (keyword, code)| {
                vocab
                    .with_entry(keyword.as_str(), code.as_str())
                    .map_err(|e| {
                        ConfigError::ValidationError(format!(
                            "extract.protection_vocabulary.{keyword}: {e}"
                        ))
                    })
            })
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.luxroute/config.toml).
    ///
    /// Environment overrides:
    /// - `LUXROUTE_API_KEY`, `OPENROUTER_API_KEY`, `OPENAI_API_KEY` (first set wins,
    ///   only when the file has no key)
    /// - `LUXROUTE_PROVIDER`, `LUXROUTE_MODEL`, `LUXROUTE_CATALOG`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
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

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("LUXROUTE_API_KEY")
                .or_else(|| lookup("OPENROUTER_API_KEY"))
                .or_else(|| lookup("OPENAI_API_KEY"));
        }
        if let Some(provider) = lookup("LUXROUTE_PROVIDER") {
            self.default_provider = provider;
        }
        if let Some(model) = lookup("LUXROUTE_MODEL") {
            self.default_model = model;
        }
        if let Some(path) = lookup("LUXROUTE_CATALOG") {
            self.catalog.path = PathBuf::from(path);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".luxroute")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.reasoner.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "reasoner.timeout_secs must be > 0".into(),
            ));
        }
        if self.cache.ttl_secs == 0 || self.cache.sweep_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "cache.ttl_secs and cache.sweep_interval_secs must be > 0".into(),
            ));
        }
        if self.router.display_limit == 0 {
            return Err(ConfigError::ValidationError(
                "router.display_limit must be > 0".into(),
            ));
        }
        if self.router.cheap_display_limit > self.router.display_limit {
            return Err(ConfigError::ValidationError(
                "router.cheap_display_limit must not exceed router.display_limit".into(),
            ));
        }
        if !(1..=3).contains(&self.router.context_window) {
            return Err(ConfigError::ValidationError(
                "router.context_window must be between 1 and 3".into(),
            ));
        }
        self.extract.protection_vocabulary()?;
        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            providers: HashMap::new(),
            reasoner: ReasonerConfig::default(),
            cache: CacheConfig::default(),
            router: RouterConfig::default(),
            catalog: CatalogConfig::default(),
            extract: ExtractConfig::default(),
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
