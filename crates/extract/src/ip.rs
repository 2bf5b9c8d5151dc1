//! Ingress-protection hierarchy.
//!
//! A static ranking of the protection classes the catalog carries, plus the
//! derivation of "every class at least as protective as X". Compound codes
//! such as `IP65/IP44` rank as their most protective component.

use regex::Regex;
use std::sync::LazyLock;

/// Known single classes and their level, least protective first.
const LEVELS: &[(&str, u8)] = &[
    ("IP20", 1),
    ("IP23", 2),
    ("IP44", 3),
    ("IP54", 4),
    ("IP65", 5),
    ("IP67", 6),
    ("IP68", 7),
];

/// Every protection value found in the catalog, compound values included.
pub const KNOWN_CLASSES: &[&str] = &[
    "IP20",
    "IP23",
    "IP44",
    "IP54",
    "IP65",
    "IP67",
    "IP68",
    "IP20/IP54",
    "IP65/IP44",
];

static IP_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)IP\d{2}").expect("valid IP code regex"));

/// All `IPxx` substrings of `s`, upper-cased, in order of appearance.
pub fn extract_codes(s: &str) -> Vec<String> {
    IP_CODE
        .find_iter(s)
        .map(|m| m.as_str().to_uppercase())
        .collect()
}

/// Level of a protection code. Compound codes use their highest embedded
/// level; `None` when no embedded code is known.
pub fn rank(code: &str) -> Option<u8> {
    extract_codes(code)
        .iter()
        .filter_map(|c| LEVELS.iter().find(|(k, _)| k == c).map(|(_, level)| *level))
        .max()
}

/// Every known class whose rank is at least the rank of `min_code`.
/// Empty for an unknown minimum.
pub fn sufficient_classes(min_code: &str) -> Vec<&'static str> {
    let Some(min) = rank(min_code) else {
        return Vec::new();
    };
    KNOWN_CLASSES
        .iter()
        .copied()
        .filter(|class| rank(class).is_some_and(|r| r >= min))
        .collect()
}

/// Whether a product's protection value satisfies the required minimum.
pub fn is_sufficient(product_code: &str, min_code: &str) -> bool {
    match (rank(product_code), rank(min_code)) {
        (Some(product), Some(min)) => product >= min,
        _ => false,
    }
}

/// German one-line description of a single class.
pub fn describe(code: &str) -> Option<&'static str> {
    let description = match code.trim().to_uppercase().as_str() {
        "IP20" => "Innenbereich, Schutz vor großen Fremdkörpern",
        "IP23" => "Innenbereich, Schutz vor Tropfwasser",
        "IP44" => "Feuchträume, Schutz vor Spritzwasser",
        "IP54" => "Außenbereich, Schutz vor Staub und Spritzwasser",
        "IP65" => "Außenbereich, vollständiger Staubschutz und Strahlwasserschutz",
        "IP67" => "Außenbereich, wasserdicht bei zeitweiligem Untertauchen",
        "IP68" => "Außenbereich, wasserdicht bei dauerndem Untertauchen",
        _ => return None,
    };
    Some(description)
}

/// Recommended classes for an application area. Unknown areas get `IP44`.
pub fn recommended_for(application: &str) -> &'static [&'static str] {
    match application.trim().to_lowercase().as_str() {
        "indoor" | "innen" => &["IP20", "IP23"],
        "bathroom" | "bad" | "badezimmer" => &["IP44", "IP54", "IP65"],
        "kitchen" | "küche" => &["IP44", "IP54"],
        "outdoor" | "außen" | "aussen" => &["IP65", "IP67", "IP68"],
        "garden" | "garten" => &["IP65", "IP67", "IP68"],
        "pool" | "schwimmbad" => &["IP67", "IP68"],
        "underground" | "unterwasser" => &["IP68"],
        _ => &["IP44"],
    }
}
