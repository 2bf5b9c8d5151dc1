//! Category-overview requests ("habt ihr Schienensysteme?").

use crate::text::{contains_any, normalize};
use serde::{Deserialize, Serialize};

/// Which overview is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverviewKind {
    TrackSystems,
    Categories,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewRequest {
    pub kind: OverviewKind,
    /// A specific track circuit sub-category, when the text names one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit: Option<String>,
}

const SINGLE_CIRCUIT: &[&str] = &["1 phase", "1-phase", "1-phasen", "einphasen", "1 circuit"];
const THREE_CIRCUIT: &[&str] = &["3 phase", "3-phase", "3-phasen", "dreiphasen", "3 circuit"];

pub const SINGLE_CIRCUIT_CATEGORY: &str = "1 circuit track system luminaires";
pub const THREE_CIRCUIT_CATEGORY: &str = "3 circuit track system luminaires";

fn track_circuit(text: &str) -> Option<&'static str> {
    if contains_any(text, SINGLE_CIRCUIT) {
        Some(SINGLE_CIRCUIT_CATEGORY)
    } else if contains_any(text, THREE_CIRCUIT) {
        Some(THREE_CIRCUIT_CATEGORY)
    } else {
        None
    }
}

pub fn category_overview(text: &str) -> Option<OverviewRequest> {
    let text = normalize(text);
    let track = text.contains("schienensystem")
        || text.contains("track system")
        || (text.contains("phase") && (text.contains("schiene") || text.contains("track")));
    if track {
        return Some(OverviewRequest {
            kind: OverviewKind::TrackSystems,
            circuit: track_circuit(&text).map(str::to_string),
        });
    }
    if text.contains("welche") && contains_any(&text, &["kategorien", "arten", "categories"]) {
        return Some(OverviewRequest {
            kind: OverviewKind::Categories,
            circuit: None,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_overview() {
        let req = category_overview("habt ihr Schienensysteme?").unwrap();
        assert_eq!(req.kind, OverviewKind::TrackSystems);
        assert_eq!(req.circuit, None);
    }

    #[test]
    fn track_circuit_follow_up() {
        let req = category_overview("Zeig mir 3-Phasen Schienensysteme").unwrap();
        assert_eq!(req.circuit.as_deref(), Some(THREE_CIRCUIT_CATEGORY));
        let req = category_overview("1 phase track").unwrap();
        assert_eq!(req.circuit.as_deref(), Some(SINGLE_CIRCUIT_CATEGORY));
    }

    #[test]
    fn general_categories() {
        let req = category_overview("Welche Produktkategorien gibt es?").unwrap();
        assert_eq!(req.kind, OverviewKind::Categories);
    }

    #[test]
    fn not_an_overview() {
        assert_eq!(category_overview("Wandleuchte 3000K"), None);
        assert_eq!(category_overview("track spot schwarz"), None);
    }
}
