//! # luxroute core
//!
//! Domain types, traits, and error definitions for the luxroute lighting
//! query router. This crate has **no framework dependencies**: it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Both external collaborators (the catalog store and the reasoning service)
//! are traits here. Implementations live in their respective crates, so the
//! router can be tested against in-memory stores and scripted reasoners.

pub mod catalog;
pub mod criteria;
pub mod error;
pub mod message;
pub mod provider;
pub mod reasoner;
pub mod route;

// Re-export key types at crate root for ergonomics
pub use catalog::{
    CatalogItem, CatalogQuery, CatalogStore, CategoryCount, Field, OrderBy, Predicate, Value,
};
pub use criteria::{Cct, Criteria, LuminaireType, SdcmBound, SdcmCategory};
pub use error::{CatalogError, ProviderError, ReasonerError};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use reasoner::{Classification, ComposedAnswer, FilterSpec, Intent, Reasoner};
pub use route::{FastPattern, RouteResponse, RoutingDecision, Tier};
