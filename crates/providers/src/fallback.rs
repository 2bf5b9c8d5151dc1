//! Ordered provider chain for the reasoning calls.
//!
//! Links are tried in order until one answers. Each link has its own
//! timeout, and an optional budget caps the whole chain so that a slow
//! primary cannot push the last fallback past the caller's deadline.

use async_trait::async_trait;
use luxroute_core::error::ProviderError;
use luxroute_core::provider::{Provider, ProviderRequest, ProviderResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

struct Link {
    provider: Arc<dyn Provider>,
    timeout: Duration,
}

/// A provider that falls through an ordered list of providers.
pub struct FallbackProvider {
    name: String,
    links: Vec<Link>,
    budget: Option<Duration>,
}

impl FallbackProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: Vec::new(),
            budget: None,
        }
    }

    /// Append a provider with its own timeout.
    pub fn add(mut self, provider: Arc<dyn Provider>, timeout: Duration) -> Self {
        self.links.push(Link { provider, timeout });
        self
    }

    /// Cap the time spent across all links. Later links get whatever is left.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Provider names in the order they are tried.
    pub fn provider_names(&self) -> Vec<&str> {
        self.links.iter().map(|l| l.provider.name()).collect()
    }

    /// Time the link may use, or `None` once the budget is spent.
    fn link_timeout(&self, link: &Link, started: Instant) -> Option<Duration> {
        match self.budget {
            None => Some(link.timeout),
            Some(budget) => {
                let left = budget.saturating_sub(started.elapsed());
                (!left.is_zero()).then(|| left.min(link.timeout))
            }
        }
    }
}

#[async_trait]
impl Provider for FallbackProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let started = Instant::now();
        let mut last_error =
            ProviderError::NotConfigured(format!("provider chain '{}' is empty", self.name));

        for (attempt, link) in self.links.iter().enumerate() {
            let provider = link.provider.name();
            let Some(timeout) = self.link_timeout(link, started) else {
                warn!(
                    chain = %self.name,
                    skipped = self.links.len() - attempt,
                    "Provider chain budget spent"
                );
                break;
            };

            debug!(provider, attempt = attempt + 1, "Trying provider");
            match tokio::time::timeout(timeout, link.provider.complete(request.clone())).await {
                Ok(Ok(response)) => {
                    if attempt > 0 {
                        info!(provider, attempt = attempt + 1, "Fallback provider answered");
                    }
                    return Ok(response);
                }
                Ok(Err(e)) => {
                    warn!(provider, error = %e, "Provider failed, trying next");
                    last_error = e;
                }
                Err(_) => {
                    warn!(
                        provider,
                        timeout_ms = timeout.as_millis() as u64,
                        "Provider timed out, trying next"
                    );
                    last_error = ProviderError::Timeout(format!(
                        "provider '{provider}' gave no answer within {}ms",
                        timeout.as_millis()
                    ));
                }
            }
        }

        Err(last_error)
    }

    /// Healthy when any link is.
    async fn health_check(&self) -> Result<bool, ProviderError> {
        for link in &self.links {
            if let Ok(true) = link.provider.health_check().await {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
