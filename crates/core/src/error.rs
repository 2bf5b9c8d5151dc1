//! Error types shared by the luxroute crates.
//!
//! One enum per external collaborator. The router turns them into
//! escalations or user-facing failure messages.

use thiserror::Error;

/// Failures of a reasoning backend.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Catalog query failed: {0}")]
    QueryFailed(String),

    #[error("Invalid catalog data: {0}")]
    InvalidData(String),

    #[error("Catalog migration failed: {0}")]
    Migration(String),
}

/// Failures of the external reasoning collaborator.
///
/// Every variant is a *technical* failure from the router's point of view:
/// it triggers escalation to the next tier, never a user-visible message.
#[derive(Debug, Clone, Error)]
pub enum ReasonerError {
    #[error("Reasoning provider failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Reasoning call timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Malformed reasoning output: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn reasoner_error_wraps_provider_error() {
        let err: ReasonerError = ProviderError::QuotaExceeded("insufficient_quota".into()).into();
        assert!(matches!(err, ReasonerError::Provider(ProviderError::QuotaExceeded(_))));
        assert!(err.to_string().contains("insufficient_quota"));
    }

    #[test]
    fn catalog_error_names_the_cause() {
        let err = CatalogError::Unavailable("pool closed".into());
        assert_eq!(err.to_string(), "Catalog unavailable: pool closed");
    }
}
