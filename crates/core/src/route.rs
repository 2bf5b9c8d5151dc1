//! Routing decisions and the uniform response every tier produces.

use crate::catalog::CatalogItem;
use crate::criteria::Criteria;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic fast-path patterns, in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FastPattern {
    ProductQuestion,
    LedStrip,
    CategoryOverview,
    DimToWarm,
    TypeWithCct,
    TypeOnly,
    TypeWithProtection,
    ProtectionOnly,
    CannedAnswer,
}

impl FastPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProductQuestion => "product_question",
            Self::LedStrip => "led_strip",
            Self::CategoryOverview => "category_overview",
            Self::DimToWarm => "dim_to_warm",
            Self::TypeWithCct => "type_with_cct",
            Self::TypeOnly => "type_only",
            Self::TypeWithProtection => "type_with_protection",
            Self::ProtectionOnly => "protection_only",
            Self::CannedAnswer => "canned_answer",
        }
    }
}

/// The resolution tier a request was answered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "tier", content = "pattern", rename_all = "snake_case")]
pub enum Tier {
    Fast(FastPattern),
    Optimized,
    Fallback,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast(pattern) => write!(f, "fast:{}", pattern.as_str()),
            Self::Optimized => f.write_str("optimized"),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

/// The strategy chosen for one query, with the criteria that led there.
///
/// Built once per query and consumed by exactly one execution.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    tier: Tier,
    criteria: Criteria,
}

impl RoutingDecision {
    pub fn new(tier: Tier, criteria: Criteria) -> Self {
        Self { tier, criteria }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn into_parts(self) -> (Tier, Criteria) {
        (self.tier, self.criteria)
    }
}

/// The uniform result of routing one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub request_id: String,
    pub items: Vec<CatalogItem>,
    /// Human-readable filters applied, in order.
    pub applied_filters: Vec<String>,
    pub answer: String,
    pub follow_ups: Vec<String>,
    pub path_taken: Tier,
    /// Matches before display selection.
    pub total_matches: usize,
    /// Served from the response cache.
    #[serde(default)]
    pub cached: bool,
    pub answered_at: DateTime<Utc>,
}

impl RouteResponse {
    pub fn new(path_taken: Tier, answer: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            items: Vec::new(),
            applied_filters: Vec::new(),
            answer: answer.into(),
            follow_ups: Vec::new(),
            path_taken,
            total_matches: 0,
            cached: false,
            answered_at: Utc::now(),
        }
    }

    pub fn with_items(mut self, items: Vec<CatalogItem>, total_matches: usize) -> Self {
        self.items = items;
        self.total_matches = total_matches;
        self
    }

    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.applied_filters = filters;
        self
    }

    pub fn with_follow_ups(mut self, follow_ups: Vec<String>) -> Self {
        self.follow_ups = follow_ups;
        self
    }

    pub fn is_fast_path(&self) -> bool {
        matches!(self.path_taken, Tier::Fast(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_display() {
        assert_eq!(Tier::Fast(FastPattern::TypeWithCct).to_string(), "fast:type_with_cct");
        assert_eq!(Tier::Fallback.to_string(), "fallback");
    }

    #[test]
    fn tier_serializes_tagged() {
        let json = serde_json::to_string(&Tier::Fast(FastPattern::LedStrip)).unwrap();
        assert!(json.contains("\"tier\":\"fast\""));
        assert!(json.contains("\"pattern\":\"led_strip\""));
        let json = serde_json::to_string(&Tier::Optimized).unwrap();
        assert_eq!(json, r#"{"tier":"optimized"}"#);
    }

    #[test]
    fn decision_keeps_criteria() {
        let criteria = Criteria {
            dimmable: true,
            ..Criteria::default()
        };
        let decision = RoutingDecision::new(Tier::Optimized, criteria.clone());
        assert_eq!(decision.tier(), Tier::Optimized);
        let (_, c) = decision.into_parts();
        assert_eq!(c, criteria);
    }

    #[test]
    fn response_builder() {
        let response = RouteResponse::new(Tier::Fast(FastPattern::TypeOnly), "ok")
            .with_filters(vec!["luminaire type: wall".into()]);
        assert!(response.is_fast_path());
        assert!(!response.request_id.is_empty());
        assert_eq!(response.applied_filters.len(), 1);
    }
}
