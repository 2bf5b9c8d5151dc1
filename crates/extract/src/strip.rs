//! LED-strip request detection.

use crate::product_question::matches_question_template;
use crate::text::{contains_any, normalize};

const STRIP_TERMS: &[&str] = &[
    "led strip",
    "led-strip",
    "ledstrip",
    "led streifen",
    "led-streifen",
    "ledstreifen",
    "led band",
    "led-band",
    "ledband",
    "led stripe",
    "lichtband",
    "licht-band",
    "lichtleiste",
];

const CONNECTOR_TERMS: &[&str] = &[
    "connector",
    "verbinder",
    "verbindung",
    "zubehör",
    "ersatzteil",
    "feedin",
    "feed-in",
    "strip2strip",
    "flex connector",
    "verbindungsstück",
    "anschluss",
    "endkappe",
];

/// Whether the text asks for LED strips. Suppressed when the text reads as
/// a question about something specific, so a product whose name contains
/// "strip" is not sent to the strip search.
pub fn led_strip(text: &str) -> bool {
    let text = normalize(text);
    contains_any(&text, STRIP_TERMS) && !matches_question_template(&text)
}

/// Whether the text explicitly asks for strip connectors or accessories.
pub fn connector_request(text: &str) -> bool {
    contains_any(&normalize(text), CONNECTOR_TERMS)
}
