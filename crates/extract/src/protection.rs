//! Ingress-protection hint extraction.
//!
//! An explicit `IPxx` in the text always wins. Otherwise wet-room and
//! outdoor vocabulary implies a minimum class, looked up in a
//! [`ProtectionVocabulary`]. The built-in vocabulary only ever implies IP44;
//! deployments extend it through configuration.

use crate::ip;
use crate::text::{normalize, tokens};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Built-in outdoor / wet-room terms. All imply IP44.
const WET_TERMS: &[&str] = &[
    "draußen",
    "draussen",
    "außen",
    "aussen",
    "outdoor",
    "garten",
    "terrasse",
    "balkon",
    "wetterfest",
    "wasserdicht",
    "feuchtraum",
    "bad",
    "dusche",
];

const DEFAULT_MIN_CLASS: &str = "IP44";

static EXPLICIT_IP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bip\s*(\d{2})\b").expect("valid explicit IP regex"));

/// Where a protection hint came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "term", rename_all = "snake_case")]
pub enum HintSource {
    Explicit,
    Vocabulary(String),
}

/// A minimum protection class implied by the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionHint {
    pub code: String,
    pub source: HintSource,
}

/// Keyword → minimum protection class.
///
/// Keywords match at the start of a token, so "garten" also covers
/// "gartenleuchte" and "bad" covers "badezimmer".
#[derive(Debug, Clone, PartialEq)]
pub struct ProtectionVocabulary {
    entries: Vec<(String, String)>,
}

impl Default for ProtectionVocabulary {
    fn default() -> Self {
        Self {
            entries: WET_TERMS
                .iter()
                .map(|t| (t.to_string(), DEFAULT_MIN_CLASS.to_string()))
                .collect(),
        }
    }
}

impl ProtectionVocabulary {
    /// Add or override one keyword. Rejects codes without a protection rank.
    pub fn with_entry(
        mut self,
        keyword: impl Into<String>,
        code: impl Into<String>,
    ) -> Result<Self, String> {
        let keyword = normalize(&keyword.into());
        let code = code.into().trim().to_uppercase();
        if ip::rank(&code).is_none() {
            return Err(format!("'{code}' is not a known protection class"));
        }
        if keyword.is_empty() {
            return Err("protection keyword must not be empty".into());
        }
        match self.entries.iter_mut().find(|(k, _)| *k == keyword) {
            Some(entry) => entry.1 = code,
            None => self.entries.push((keyword, code)),
        }
        Ok(self)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c.as_str()))
    }

    /// The most demanding class any keyword in `text` implies.
    pub fn lookup(&self, text: &str) -> Option<(&str, &str)> {
        let normalized = normalize(text);
        let words: Vec<&str> = tokens(&normalized).collect();
        self.entries()
            .filter(|(keyword, _)| words.iter().any(|w| w.starts_with(keyword)))
            .max_by_key(|(_, code)| ip::rank(code))
    }
}

/// Extract the minimum protection class the text asks for.
pub fn protection_hint(text: &str, vocabulary: &ProtectionVocabulary) -> Option<ProtectionHint> {
    let normalized = normalize(text);
    if let Some(caps) = EXPLICIT_IP.captures(&normalized) {
        return Some(ProtectionHint {
            code: format!("IP{}", &caps[1]),
            source: HintSource::Explicit,
        });
    }
    vocabulary
        .lookup(&normalized)
        .map(|(keyword, code)| ProtectionHint {
            code: code.to_string(),
            source: HintSource::Vocabulary(keyword.to_string()),
        })
}
