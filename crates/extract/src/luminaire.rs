//! Luminaire-type extraction.

use crate::text::{contains_any, has_word, normalize};
use luxroute_core::LuminaireType;

/// German compounds match anywhere; English words only at a token start.
struct Keywords {
    kind: LuminaireType,
    german: &'static [&'static str],
    english: &'static [&'static str],
}

/// First specific match wins, so order is significant.
const TYPE_KEYWORDS: &[Keywords] = &[
    Keywords {
        kind: LuminaireType::Ceiling,
        german: &["deckenleuchte", "deckenlampe", "deckenstrahler"],
        english: &["ceiling"],
    },
    Keywords {
        kind: LuminaireType::Wall,
        german: &["wandleuchte", "wandlampe", "wandstrahler"],
        english: &["wall"],
    },
    Keywords {
        kind: LuminaireType::Floor,
        german: &["stehleuchte", "stehlampe"],
        english: &["floor"],
    },
    Keywords {
        kind: LuminaireType::Pendant,
        german: &["pendelleuchte", "pendellampe", "hängeleuchte", "haengeleuchte"],
        english: &["pendant"],
    },
    Keywords {
        kind: LuminaireType::Table,
        german: &["tischleuchte", "tischlampe"],
        english: &["table"],
    },
    Keywords {
        kind: LuminaireType::Inground,
        german: &["bodeneinbauleuchte", "bodenleuchte"],
        english: &["inground", "in-ground"],
    },
    Keywords {
        kind: LuminaireType::Outdoor,
        german: &["außenleuchte", "aussenleuchte", "gartenleuchte"],
        english: &["outdoor", "garden"],
    },
    Keywords {
        kind: LuminaireType::Track,
        german: &["schienensystem", "schienenleuchte", "stromschiene"],
        english: &["track"],
    },
];

const GENERIC_GERMAN: &[&str] = &["leuchte", "lampe", "strahler"];
const GENERIC_ENGLISH: &[&str] = &["lamp", "luminaire", "light fixture", "fixture"];

/// Terms that name a component rather than a finished luminaire.
const COMPONENT_TERMS: &[&str] = &[
    "modul",
    "module",
    "komponente",
    "component",
    "led chip",
    "led-chip",
    "treiber",
    "driver",
    "netzteil",
];

fn matches_english(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| {
        if w.contains(' ') || w.contains('-') {
            text.contains(w)
        } else {
            has_word(text, w)
        }
    })
}

/// The luminaire category a text asks for.
///
/// Returns `Unknown` for a bare generic term and `None` when nothing
/// luminaire-like is mentioned at all.
pub fn luminaire_type(text: &str) -> Option<LuminaireType> {
    let text = normalize(text);
    TYPE_KEYWORDS
        .iter()
        .find(|k| contains_any(&text, k.german) || matches_english(&text, k.english))
        .map(|k| k.kind)
        .or_else(|| {
            (contains_any(&text, GENERIC_GERMAN) || matches_english(&text, GENERIC_ENGLISH))
                .then_some(LuminaireType::Unknown)
        })
}

/// Whether the text is about finished luminaires, as opposed to components
/// or a bare attribute.
pub fn is_luminaire_request(text: &str) -> bool {
    let text = normalize(text);
    let mentions = contains_any(&text, GENERIC_GERMAN) || matches_english(&text, GENERIC_ENGLISH);
    mentions && !contains_any(&text, COMPONENT_TERMS)
}
