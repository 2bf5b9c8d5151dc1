//! Dim-to-warm and dimmable flags.

use crate::text::{contains_any, normalize};

const DIM_TO_WARM_TERMS: &[&str] = &[
    "dim to warm",
    "dim-to-warm",
    "dimtowarm",
    "dim2warm",
    "warm dim",
    "1800-3000",
    "1800k-3000k",
];

const DIMMABLE_TERMS: &[&str] = &["dimmbar", "dimmable", "dimming", "dimmen", "dimmung"];

const NOT_DIMMABLE_TERMS: &[&str] = &["nicht dimmbar", "non-dimmable", "not dimmable"];

pub fn dim_to_warm(text: &str) -> bool {
    let text = normalize(text);
    contains_any(&text, DIM_TO_WARM_TERMS) || (text.contains("1800") && text.contains("3000"))
}

/// Dim-to-warm implies dimmable. An explicit negation never sets the flag.
pub fn dimmable(text: &str) -> bool {
    let text = normalize(text);
    if contains_any(&text, NOT_DIMMABLE_TERMS) {
        return false;
    }
    contains_any(&text, DIMMABLE_TERMS) || dim_to_warm(&text)
}
