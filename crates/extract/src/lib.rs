//! # luxroute-extract
//!
//! Deterministic attribute extractors for lighting-catalog queries.
//!
//! Every extractor is a total function over lower-cased text: ambiguity is
//! represented as an unconstrained (`None` / `false`) result, never as an
//! error. [`QuerySignals::extract`] runs them all in the fixed order routing
//! depends on.

pub mod canned;
pub mod cct;
pub mod dimming;
pub mod ip;
pub mod luminaire;
pub mod overview;
pub mod preferences;
pub mod product_question;
pub mod protection;
pub mod sdcm;
pub mod signals;
pub mod strip;
mod text;

pub use canned::{CannedTopic, canned_topic};
pub use overview::{OverviewKind, OverviewRequest, category_overview};
pub use product_question::{ProductQuestion, QuestionKind, product_question};
pub use protection::{HintSource, ProtectionHint, ProtectionVocabulary, protection_hint};
pub use signals::QuerySignals;
pub use text::normalize;
