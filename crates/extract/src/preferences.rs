//! Housing colour, price preference and the residual search term.

use crate::cct::CCT_PHRASES;
use crate::text::{normalize, tokens};

const COLORS: &[(&[&str], &str)] = &[
    (&["weiß", "weiss", "white"], "White"),
    (&["schwarz", "black"], "Black"),
    (&["grau", "grey", "gray", "anthrazit"], "Grey"),
    (&["silber", "silver"], "Silver"),
    (&["gold"], "Gold"),
    (&["messing", "brass"], "Brass"),
];

const CHEAPER_TERMS: &[&str] = &["günstig", "billig", "preiswert", "cheap", "budget"];

/// Words that carry no search meaning on their own.
const STOP_WORDS: &[&str] = &[
    "ich", "suche", "brauche", "möchte", "hätte", "gern", "gerne", "bitte", "eine", "einen",
    "ein", "einer", "der", "die", "das", "den", "dem", "mit", "für", "fürs", "und", "oder",
    "im", "in", "am", "an", "auf", "zu", "zum", "zur", "von", "mir", "zeig", "zeige", "habt",
    "ihr", "haben", "sie", "gibt", "es", "welche", "welcher", "etwas", "mal", "auch", "noch",
    "i", "need", "want", "looking", "for", "a", "an", "the", "with", "and", "or", "show", "me",
    "some", "please",
];

/// Words already consumed by a typed extractor.
const FEATURE_PREFIXES: &[&str] = &[
    "leuchte", "lampe", "strahler", "luminaire", "lamp", "light", "wandleuchte", "wandlampe",
    "deckenleuchte", "deckenlampe", "stehleuchte", "stehlampe", "pendelleuchte", "pendellampe",
    "hängeleuchte", "tischleuchte", "tischlampe", "bodeneinbauleuchte", "außenleuchte",
    "aussenleuchte", "schienen", "wall", "ceiling", "floor", "pendant", "table", "track",
    "outdoor", "dimmbar", "dimmable", "dimmen", "schaltbar", "umschaltbar", "switchable",
    "wechselbar", "warmweiß", "warmweiss", "kaltweiß", "kaltweiss", "neutralweiß",
    "neutralweiss", "kelvin", "sdcm", "günstig", "billig", "preiswert", "cheap", "led",
    "strip", "streifen", "cct",
];

fn strip_cct_phrases(text: &str) -> String {
    CCT_PHRASES
        .iter()
        .fold(text.to_string(), |acc, (phrase, _)| acc.replace(phrase, " "))
}

/// The catalog housing colour the text asks for, e.g. "White".
///
/// Colour-temperature phrases are removed first so "warmweiß" never reads
/// as a white housing.
pub fn housing_color(text: &str) -> Option<&'static str> {
    let text = strip_cct_phrases(&normalize(text));
    let words: Vec<&str> = tokens(&text).collect();
    COLORS
        .iter()
        .find(|(names, _)| {
            words
                .iter()
                .any(|w| names.iter().any(|n| w.starts_with(n)))
        })
        .map(|(_, color)| *color)
}

/// Whether the text asks for the cheaper end of the range.
pub fn cheaper(text: &str) -> bool {
    let text = normalize(text);
    CHEAPER_TERMS.iter().any(|t| text.contains(t))
}

fn is_consumed(token: &str) -> bool {
    let is_kelvin = token.len() >= 5
        && token.ends_with('k')
        && token[..token.len() - 1].chars().all(|c| c.is_ascii_digit());
    let is_ip = token.len() == 4 && token.starts_with("ip") && token[2..].chars().all(|c| c.is_ascii_digit());
    is_kelvin
        || is_ip
        || token.chars().all(|c| c.is_ascii_digit())
        || STOP_WORDS.contains(&token)
        || FEATURE_PREFIXES
            .iter()
            .any(|p| token.starts_with(p) || token.ends_with(p))
}

/// The words no typed extractor consumed, space-joined.
pub fn residual_term(text: &str) -> Option<String> {
    let text = normalize(text);
    let rest: Vec<&str> = tokens(&text).filter(|t| !is_consumed(t)).collect();
    (!rest.is_empty()).then(|| rest.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors() {
        assert_eq!(housing_color("weiße Wandleuchte 3000K"), Some("White"));
        assert_eq!(housing_color("black pendant"), Some("Black"));
        assert_eq!(housing_color("Anthrazit Strahler"), Some("Grey"));
        assert_eq!(housing_color("Wandleuchte"), None);
    }

    #[test]
    fn cct_phrases_are_not_colors() {
        assert_eq!(housing_color("warmweiße Deckenleuchte"), None);
        assert_eq!(housing_color("kaltweiß, Gehäuse schwarz"), Some("Black"));
    }

    #[test]
    fn cheaper_signal() {
        assert!(cheaper("günstige Wandleuchte"));
        assert!(cheaper("cheapest option"));
        assert!(!cheaper("Wandleuchte"));
    }

    #[test]
    fn residual_keeps_unconsumed_words() {
        assert_eq!(residual_term("weiße Wandleuchte 3000K").as_deref(), Some("weiße"));
        assert_eq!(residual_term("Salsa Deckenleuchte IP44").as_deref(), Some("salsa"));
        assert_eq!(residual_term("ich suche eine Wandleuchte"), None);
    }
}
