//! # luxroute-router
//!
//! Tiered routing of lighting-catalog queries.
//!
//! Deterministic extractors feed a fixed rule table. A match answers on the
//! fast path with plain catalog queries and at most one reasoning call.
//! Everything else goes through the optimized tier (classification in
//! parallel with a direct query, then a free-text search) and finally the
//! full-reasoning fallback.

pub mod answers;
pub mod cache;
pub mod context_filter;
pub mod error;
pub mod reasoner;
pub mod router;
pub mod rules;
pub mod search;
pub mod selection;

#[cfg(test)]
#[allow(dead_code)]
mod test_helpers;

pub use cache::ResponseCache;
pub use context_filter::ContextFilter;
pub use error::RouteError;
pub use reasoner::LlmReasoner;
pub use router::TieredRouter;
pub use selection::DisplayLimits;
