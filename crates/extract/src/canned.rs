//! Canned educational questions ("was ist IP44?").

use crate::ip;
use crate::text::{contains_any, normalize};
use serde::{Deserialize, Serialize};

const QUESTION_OPENERS: &[&str] = &[
    "was ist",
    "was sind",
    "was bedeutet",
    "was heißt",
    "erkläre",
    "erklär mir",
    "unterschied",
    "wie funktioniert",
    "what is",
    "what does",
    "difference between",
    "explain",
];

/// The topics with a fixed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "code", rename_all = "snake_case")]
pub enum CannedTopic {
    /// A specific known protection class.
    IpCode(String),
    IpClasses,
    WarmVsCold,
    Sdcm,
    Cct,
}

/// Detect an educational question with a fixed answer. Requires a
/// question phrasing, so "IP44 Leuchten" is not a canned question.
pub fn canned_topic(text: &str) -> Option<CannedTopic> {
    let text = normalize(text);
    if !contains_any(&text, QUESTION_OPENERS) {
        return None;
    }
    if let Some(code) = ip::extract_codes(&text)
        .into_iter()
        .find(|c| ip::describe(c).is_some())
    {
        return Some(CannedTopic::IpCode(code));
    }
    if contains_any(
        &text,
        &["ip schutzklasse", "ip-schutzklasse", "schutzklassen", "schutzart", "ip rating", "ip code"],
    ) {
        return Some(CannedTopic::IpClasses);
    }
    let warm = contains_any(&text, &["warmweiß", "warmweiss", "warm white"]);
    let cold = contains_any(&text, &["kaltweiß", "kaltweiss", "cool white", "cold white"]);
    if warm && cold {
        return Some(CannedTopic::WarmVsCold);
    }
    if contains_any(&text, &["sdcm", "farbkonsistenz", "color consistency"]) {
        return Some(CannedTopic::Sdcm);
    }
    if contains_any(&text, &["farbtemperatur", "cct", "kelvin", "color temperature"]) {
        return Some(CannedTopic::Cct);
    }
    None
}
