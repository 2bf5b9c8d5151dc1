//! The failures `route` surfaces to its caller.

use luxroute_core::error::{CatalogError, ReasonerError};
use luxroute_core::route::{RouteResponse, Tier};
use thiserror::Error;

/// Apology shown when the catalog cannot be reached.
pub const CATALOG_APOLOGY: &str = "Entschuldigung, unser Produktkatalog ist gerade nicht erreichbar. \
     Bitte versuche es in ein paar Minuten noch einmal.";

/// Apology shown when the reasoning service fails on the last tier.
pub const REASONING_APOLOGY: &str = "Entschuldigung, ich kann deine Anfrage gerade nicht bearbeiten. \
     Bitte formuliere sie etwas anders oder versuche es später noch einmal.";

/// A routing failure every tier gave up on.
///
/// `Display` is fixed text. The upstream error stays reachable through
/// `source()` for logs and never reaches the user.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("catalog unavailable")]
    CatalogUnavailable(#[source] CatalogError),

    #[error("reasoning service unavailable")]
    ReasoningUnavailable(#[source] ReasonerError),
}

impl RouteError {
    /// The user-facing apology for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::CatalogUnavailable(_) => CATALOG_APOLOGY,
            Self::ReasoningUnavailable(_) => REASONING_APOLOGY,
        }
    }

    /// A well-formed response carrying the apology and no items.
    pub fn to_response(&self) -> RouteResponse {
        RouteResponse::new(Tier::Fallback, self.user_message()).with_follow_ups(vec![
            "Kannst du deine Anfrage anders formulieren?".to_string(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luxroute_core::error::ProviderError;
    use std::error::Error as _;

    #[test]
    fn display_hides_upstream_text() {
        let err = RouteError::ReasoningUnavailable(ReasonerError::Provider(
            ProviderError::QuotaExceeded("sk-live-1234 has no credit".into()),
        ));
        assert!(!err.to_string().contains("sk-live"));
        assert!(!err.user_message().contains("sk-live"));
        assert!(err.source().unwrap().to_string().contains("sk-live"));
    }

    #[test]
    fn response_from_error() {
        let err = RouteError::CatalogUnavailable(CatalogError::Unavailable("pool closed".into()));
        let response = err.to_response();
        assert_eq!(response.path_taken, Tier::Fallback);
        assert!(response.items.is_empty());
        assert_eq!(response.answer, CATALOG_APOLOGY);
        assert!(!response.answer.contains("pool"));
    }
}
