//! Detection of questions about one named product ("ist Salsa Lid dimmbar?").
//!
//! Templates run case-insensitively against the trimmed original text so the
//! extracted name keeps the casing the user typed.

use crate::text::normalize;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// What a named-product question asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Dimmable,
    Brightness,
    Power,
    ColorTemperature,
    Protection,
    Color,
    Price,
    Availability,
    Suitability,
    General,
}

impl QuestionKind {
    fn from_attribute(word: &str) -> Self {
        match word.to_lowercase().as_str() {
            "dimmbar" | "dimmable" => Self::Dimmable,
            "lumen" | "hell" => Self::Brightness,
            "watt" => Self::Power,
            "kelvin" | "warm" | "kalt" | "farbtemperatur" => Self::ColorTemperature,
            "wasserdicht" | "waterproof" | "ip" | "schutzklasse" => Self::Protection,
            "farbe" => Self::Color,
            "euro" | "teuer" => Self::Price,
            "verfügbar" | "lieferbar" | "available" => Self::Availability,
            _ => Self::General,
        }
    }
}

/// A detected named-product question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuestion {
    pub name: String,
    pub kind: QuestionKind,
}

/// Where the name and the attribute sit in a template's captures.
enum Attribute {
    Group(usize),
    Fixed(QuestionKind),
}

struct Template {
    pattern: Regex,
    name_group: usize,
    attribute: Attribute,
}

fn template(pattern: &str, name_group: usize, attribute: Attribute) -> Template {
    Template {
        pattern: Regex::new(pattern).expect("valid product question template"),
        name_group,
        attribute,
    }
}

static TEMPLATES: LazyLock<Vec<Template>> = LazyLock::new(|| {
    vec![
        template(
            r"(?i)^ist\s+(.+?)\s+(dimmbar|wasserdicht|verfügbar|lieferbar)$",
            1,
            Attribute::Group(2),
        ),
        template(
            r"(?i)^ist\s+(.+?)\s+(?:gut\s+geeignet|geeignet|gut)\s+(?:für|fürs|zum|zur|im|in)\s+.+$",
            1,
            Attribute::Fixed(QuestionKind::Suitability),
        ),
        template(
            r"(?i)^hat\s+(.+?)\s+(?:wie\s*viele?)\s+(lumen|watt|kelvin)$",
            1,
            Attribute::Group(2),
        ),
        template(
            r"(?i)^wie\s*viele?\s+(lumen|watt|kelvin|euro)\s+hat\s+(.+)$",
            2,
            Attribute::Group(1),
        ),
        template(
            r"(?i)^wie\s+(hell|warm|kalt|groß|teuer)\s+ist\s+(.+)$",
            2,
            Attribute::Group(1),
        ),
        template(
            r"(?i)^welche\s+(farbe|farbtemperatur|größe|ip|schutzklasse)\s+hat\s+(.+)$",
            2,
            Attribute::Group(1),
        ),
        template(
            r"(?i)^was\s+kostet\s+(.+)$",
            1,
            Attribute::Fixed(QuestionKind::Price),
        ),
        template(
            r"(?i)^wie\s+ist\s+(.+)$",
            1,
            Attribute::Fixed(QuestionKind::General),
        ),
        template(
            r"(?i)^is\s+(.+?)\s+(dimmable|waterproof|available)$",
            1,
            Attribute::Group(2),
        ),
    ]
});

/// Openers that make a sentence a search, not a product question.
static SEARCH_OPENERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:ich\s+(?:suche|brauche|möchte|hätte)|gibt\s+es|haben\s+sie|habt\s+ihr|zeig|empfehl|welche.*gibt\s+es)",
    )
    .expect("valid search opener regex")
});

static LOOSE_QUESTION: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bist\s+([a-z0-9\s]+)\s+(gut|dimmbar|hell|geeignet)\b",
        r"\bwie\s+(ist|sind)\s+",
        r"\bwas\s+(ist|sind)\s+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid loose question regex"))
    .collect()
});

static BARE_IP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ip\s*\d{2}$").expect("valid bare IP regex"));

const ARTICLES: &[&str] = &[
    "ein", "eine", "einen", "einer", "der", "die", "das", "den", "dem", "a", "an", "the",
];

fn plausible_name(name: &str) -> bool {
    let lowered = name.to_lowercase();
    name.chars().count() > 2
        && !lowered.split_whitespace().any(|w| ARTICLES.contains(&w))
        && !lowered.contains("strip")
        && !BARE_IP.is_match(name)
}

/// Detect a question about one named product.
pub fn product_question(text: &str) -> Option<ProductQuestion> {
    let trimmed = text
        .trim()
        .trim_end_matches(['?', '!', '.'])
        .trim();
    if SEARCH_OPENERS.is_match(&normalize(trimmed)) {
        return None;
    }
    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");

    TEMPLATES.iter().find_map(|t| {
        let caps = t.pattern.captures(&collapsed)?;
        let name = caps.get(t.name_group)?.as_str().trim();
        if !plausible_name(name) {
            return None;
        }
        let kind = match t.attribute {
            Attribute::Group(i) => QuestionKind::from_attribute(caps.get(i)?.as_str()),
            Attribute::Fixed(kind) => kind,
        };
        Some(ProductQuestion {
            name: name.to_string(),
            kind,
        })
    })
}

/// Whether the text reads like a question about something specific, even
/// if no strict template matched. Used to keep product names containing
/// "strip" away from the LED-strip search.
pub fn matches_question_template(text: &str) -> bool {
    let text = normalize(text);
    LOOSE_QUESTION.iter().any(|re| re.is_match(&text))
}
