//! Colour-temperature extraction: the target value and CCT switchability.

use crate::text::{contains_any, normalize};
use luxroute_core::Cct;
use regex::Regex;
use std::sync::LazyLock;

/// A Kelvin range such as "1800-3000K" or "2700K bis 3000K".
static KELVIN_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})\s*(?:k(?:elvin)?\s*)?(?:-|–|bis)\s*(\d{4})\s*(?:kelvin|k)\b")
        .expect("valid kelvin range regex")
});

/// Ranges starting below the lowest catalog value are the dim-to-warm band.
const DIM_TO_WARM_FLOOR: u32 = 2700;

static KELVIN_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\s*(?:kelvin|k)\b").expect("valid kelvin regex"));

/// Keyword phrases, checked after explicit values. Also stripped by the
/// housing-colour extractor so "warmweiß" is not read as a white housing.
pub(crate) const CCT_PHRASES: &[(&str, Cct)] = &[
    ("warmweiß", Cct::K2700),
    ("warm weiß", Cct::K2700),
    ("warmweiss", Cct::K2700),
    ("warm weiss", Cct::K2700),
    ("warm white", Cct::K2700),
    ("warm-white", Cct::K2700),
    ("neutralweiß", Cct::K3000),
    ("neutral weiß", Cct::K3000),
    ("neutralweiss", Cct::K3000),
    ("neutral weiss", Cct::K3000),
    ("neutral white", Cct::K3000),
    ("kaltweiß", Cct::K4000),
    ("kalt weiß", Cct::K4000),
    ("kaltweiss", Cct::K4000),
    ("kalt weiss", Cct::K4000),
    ("cool white", Cct::K4000),
    ("cold white", Cct::K4000),
    ("tageslichtweiß", Cct::K4000),
];

const SWITCH_TERMS: &[&str] = &[
    "cct switch",
    "cct-switch",
    "cctswitch",
    "schaltbar",
    "umschaltbar",
    "switchable",
    "wechselbar",
    "farbtemperatur einstellbar",
];

/// The requested colour temperature, if it is one the catalog offers.
///
/// An explicit Kelvin value outside the allow-list leaves the query
/// unconstrained rather than falling back to keywords.
pub fn cct_value(text: &str) -> Option<Cct> {
    let text = normalize(text);
    let text = KELVIN_RANGE.replace_all(&text, |caps: &regex::Captures<'_>| {
        match caps[1].parse::<u32>() {
            Ok(low) if low >= DIM_TO_WARM_FLOOR => format!("{}k {}k", &caps[1], &caps[2]),
            _ => " ".to_string(),
        }
    });
    let explicit: Vec<u32> = KELVIN_VALUE
        .captures_iter(&text)
        .filter_map(|c| c[1].parse().ok())
        .collect();
    if !explicit.is_empty() {
        return explicit.into_iter().find_map(Cct::from_kelvin);
    }
    CCT_PHRASES
        .iter()
        .find(|(phrase, _)| text.contains(phrase))
        .map(|(_, cct)| *cct)
}

/// Whether the text asks for switchable colour temperature.
pub fn cct_switch(text: &str) -> bool {
    contains_any(&normalize(text), SWITCH_TERMS)
}
