//! Reasoning provider implementations for luxroute.
//!
//! All providers implement the `luxroute_core::Provider` trait.
//! The router builds the configured provider (or fallback chain).

pub mod fallback;
pub mod openai_compat;
pub mod router;

pub use fallback::FallbackProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
