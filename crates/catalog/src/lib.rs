//! Catalog store implementations for luxroute.
//!
//! Both stores implement `luxroute_core::CatalogStore` and agree with the
//! reference predicate semantics in `luxroute_core::catalog`.

pub mod in_memory;
pub mod seed;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::{InMemoryCatalog, sort_items};
pub use seed::{load_items_json, parse_items};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCatalog;
