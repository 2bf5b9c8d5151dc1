//! Provider router: builds the reasoning provider from configuration.
//!
//! Every configured provider is registered by name. The default provider is
//! always present; when `reasoner.fallback_providers` is set, the default and
//! the listed providers are wrapped into a [`FallbackProvider`] chain.

use crate::fallback::FallbackProvider;
use crate::openai_compat::OpenAiCompatProvider;
use luxroute_core::provider::Provider;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Named registry of providers.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// The provider the reasoner should use: the default alone, or a
    /// fallback chain headed by it.
    ///
    /// A chain shares `timeout` as its budget. Each link gets an even share
    /// of it, so a hanging primary still leaves time for the fallbacks.
    pub fn chain(&self, fallbacks: &[String], timeout: Duration) -> Option<Arc<dyn Provider>> {
        let primary = self.default()?;
        let mut links = vec![primary];
        for name in fallbacks {
            match self.get(name) {
                Some(provider) => links.push(provider),
                None => warn!(provider = %name, "Unknown fallback provider, skipping"),
            }
        }
        if links.len() == 1 {
            return links.pop();
        }

        let share = timeout / links.len() as u32;
        let chain = links
            .into_iter()
            .fold(FallbackProvider::new("fallback"), |chain, provider| {
                chain.add(provider, share)
            })
            .with_budget(timeout);
        Some(Arc::new(chain))
    }
}

/// Build providers from configuration.
pub fn build_router(config: &luxroute_config::AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let base_url = provider_config
            .api_url
            .clone()
            .unwrap_or_else(|| default_base_url(name));

        router.register(
            name.clone(),
            Arc::new(OpenAiCompatProvider::new(name, &base_url, &api_key)),
        );
    }

    // Ensure the default provider exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        let api_key = config.api_key.clone().unwrap_or_default();
        let base_url = default_base_url(&config.default_provider);
        router.register(
            config.default_provider.clone(),
            Arc::new(OpenAiCompatProvider::new(
                &config.default_provider,
                &base_url,
                &api_key,
            )),
        );
    }

    router
}

/// The reasoning provider described by `config`.
pub fn build_from_config(config: &luxroute_config::AppConfig) -> Arc<dyn Provider> {
    let router = build_router(config);
    let timeout = Duration::from_secs(config.reasoner.timeout_secs);
    match router.chain(&config.reasoner.fallback_providers, timeout) {
        Some(provider) => provider,
        None => Arc::new(OpenAiCompatProvider::new(
            &config.default_provider,
            default_base_url(&config.default_provider),
            config.api_key.clone().unwrap_or_default(),
        )),
    }
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "fireworks" => "https://api.fireworks.ai/inference/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
