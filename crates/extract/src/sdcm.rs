//! SDCM (colour consistency) bound extraction.
//!
//! Lower SDCM is better, so "unter 3 SDCM" is an upper bound and
//! "mindestens 3 SDCM" a lower one. Without a direction word a bare
//! "SDCM 3" reads as an upper bound, which is how buyers quote it.

use crate::text::normalize;
use luxroute_core::{SdcmBound, SdcmCategory};
use regex::Regex;
use std::sync::LazyLock;

static SDCM_THEN_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"sdcm\s*(<=|>=|[<>≤≥])?\s*(\d+)").expect("valid sdcm-value regex")
});

static UPPER_THEN_SDCM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:unter|max(?:imal)?|höchstens|<|≤)\s*(\d+)\s*sdcm")
        .expect("valid upper sdcm regex")
});

static LOWER_THEN_SDCM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:über|mindestens|min(?:imum)?|>|≥)\s*(\d+)\s*sdcm")
        .expect("valid lower sdcm regex")
});

#[derive(Clone, Copy, PartialEq)]
enum Direction {
    Min,
    Max,
}

fn bound(direction: Direction, value: &str) -> Option<SdcmBound> {
    let value: u8 = value.parse().ok()?;
    Some(match direction {
        Direction::Max => SdcmBound::at_most(value),
        Direction::Min => SdcmBound::at_least(value),
    })
}

fn direction_around(text: &str, start: usize, end: usize, operator: Option<&str>) -> Direction {
    match operator {
        Some(">" | ">=" | "≥") => return Direction::Min,
        Some("<" | "<=" | "≤") => return Direction::Max,
        _ => {}
    }
    let before = &text[..start];
    let after = &text[end..];
    let before_words: Vec<&str> = before.split_whitespace().rev().take(2).collect();
    if before_words
        .iter()
        .any(|w| matches!(*w, "mindestens" | "min" | "minimum" | "über"))
        || after.trim_start().starts_with("mindestens")
    {
        Direction::Min
    } else {
        Direction::Max
    }
}

/// Extract an SDCM bound from the text.
pub fn sdcm_bound(text: &str) -> Option<SdcmBound> {
    let text = normalize(text);

    if let Some(caps) = SDCM_THEN_VALUE.captures(&text) {
        let whole = caps.get(0)?;
        let direction = direction_around(
            &text,
            whole.start(),
            whole.end(),
            caps.get(1).map(|m| m.as_str()),
        );
        return bound(direction, &caps[2]);
    }
    if let Some(caps) = UPPER_THEN_SDCM.captures(&text) {
        return bound(Direction::Max, &caps[1]);
    }
    if let Some(caps) = LOWER_THEN_SDCM.captures(&text) {
        return bound(Direction::Min, &caps[1]);
    }

    if text.contains("sehr hohe farbkonsistenz") || text.contains("premium farbkonsistenz") {
        return Some(SdcmBound {
            min: None,
            max: Some(SdcmCategory::Premium.max_value()),
            category: Some(SdcmCategory::Premium),
        });
    }
    if text.contains("hohe farbkonsistenz") || text.contains("high color consistency") {
        return Some(SdcmBound::at_most(SdcmCategory::High.max_value()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_value_is_upper_bound() {
        let b = sdcm_bound("Downlight SDCM 3").unwrap();
        assert_eq!(b.max, Some(3));
        assert_eq!(b.category, Some(SdcmCategory::Premium));
    }

    #[test]
    fn operators() {
        assert_eq!(sdcm_bound("sdcm < 4").unwrap().max, Some(4));
        assert_eq!(sdcm_bound("sdcm>2").unwrap().min, Some(2));
        assert_eq!(sdcm_bound("SDCM ≤ 3").unwrap().max, Some(3));
    }

    #[test]
    fn direction_words() {
        assert_eq!(sdcm_bound("unter 3 SDCM").unwrap().max, Some(3));
        assert_eq!(sdcm_bound("mindestens SDCM 2").unwrap().min, Some(2));
        assert_eq!(sdcm_bound("über 2 sdcm").unwrap().min, Some(2));
        assert_eq!(sdcm_bound("max 5 sdcm").unwrap().category, Some(SdcmCategory::Good));
    }

    #[test]
    fn quality_phrases() {
        let premium = sdcm_bound("sehr hohe Farbkonsistenz").unwrap();
        assert_eq!(premium.max, Some(3));
        assert_eq!(premium.category, Some(SdcmCategory::Premium));
        let high = sdcm_bound("hohe Farbkonsistenz bitte").unwrap();
        assert_eq!(high.max, Some(4));
        assert_eq!(high.category, Some(SdcmCategory::High));
    }

    #[test]
    fn nothing_to_extract() {
        assert_eq!(sdcm_bound("Wandleuchte 3000K"), None);
    }
}
