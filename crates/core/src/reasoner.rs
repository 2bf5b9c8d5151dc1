//! Reasoner trait: the external reasoning collaborator.
//!
//! Three call shapes (classify, extract filters, compose an answer) plus the
//! assisted search-term extraction used by plain text search. Implementations
//! must treat model output as untrusted and hand back validated values.

use crate::catalog::CatalogItem;
use crate::criteria::Criteria;
use crate::error::ReasonerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The intent category a query is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// "I need a light for ..."
    Recommendation,
    /// A question about one specific product.
    ProductQuestion,
    /// Comparing two or more products.
    Comparison,
    /// "Something like X"
    SimilarProducts,
}

impl Intent {
    /// The tag the classifier prompt uses for this intent.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Recommendation => "produktempfehlung",
            Self::ProductQuestion => "produktfrage",
            Self::Comparison => "produktvergleich",
            Self::SimilarProducts => "aehnliche_produktsuche",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "produktempfehlung" | "recommendation" => Some(Self::Recommendation),
            "produktfrage" | "product_question" => Some(Self::ProductQuestion),
            "produktvergleich" | "comparison" => Some(Self::Comparison),
            "aehnliche_produktsuche" | "ähnliche_produktsuche" | "similar_products" => {
                Some(Self::SimilarProducts)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Output of the classify call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    /// 0.0 ..= 1.0
    pub confidence: f32,
    pub rationale: String,
}

/// Output of the extract-filters call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    pub criteria: Criteria,
    /// Free-text term to match against names and descriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    pub rationale: String,
    /// Set when the model output could not be used and a broad default query
    /// stands in for it.
    #[serde(default)]
    pub broad: bool,
}

impl FilterSpec {
    /// The default broad query used when model output is malformed.
    pub fn broad(rationale: impl Into<String>) -> Self {
        Self {
            criteria: Criteria::default(),
            search_term: None,
            rationale: rationale.into(),
            broad: true,
        }
    }
}

/// Output of the compose-answer call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedAnswer {
    pub text: String,
    pub follow_ups: Vec<String>,
}

/// The external reasoning collaborator.
///
/// Every method may fail with a technical error (quota, timeout, malformed
/// output); callers decide which tier that escalates to.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Classify the query, given the relevant prior turns.
    async fn classify(
        &self,
        text: &str,
        context: &[String],
    ) -> Result<Classification, ReasonerError>;

    /// Turn the query into structured criteria. Malformed model output must
    /// come back as `FilterSpec::broad`, not as an error.
    async fn extract_filters(
        &self,
        text: &str,
        intent: Intent,
        context: &[String],
    ) -> Result<FilterSpec, ReasonerError>;

    /// Write the natural-language answer for a bounded list of items.
    async fn compose_answer(
        &self,
        text: &str,
        intent: Intent,
        items: &[CatalogItem],
        context: &[String],
    ) -> Result<ComposedAnswer, ReasonerError>;

    /// Pull the most useful catalog search term out of the query.
    async fn extract_search_term(&self, text: &str) -> Result<String, ReasonerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_tags_roundtrip() {
        for intent in [
            Intent::Recommendation,
            Intent::ProductQuestion,
            Intent::Comparison,
            Intent::SimilarProducts,
        ] {
            assert_eq!(Intent::from_tag(intent.tag()), Some(intent));
        }
        assert_eq!(Intent::from_tag("smalltalk"), None);
    }

    #[test]
    fn broad_spec_is_flagged() {
        let spec = FilterSpec::broad("unparsable");
        assert!(spec.broad);
        assert!(!spec.criteria.has_constraints());
    }
}
