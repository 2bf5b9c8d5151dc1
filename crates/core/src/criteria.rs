//! Criteria: the structured, partially-filled set of search constraints
//! derived from free text.
//!
//! Every field is optional or a flag. Absence means "unconstrained", never
//! "exclude".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sub-category values the catalog uses for real luminaires.
pub const LUMINAIRE_CATEGORIES: &[&str] = &[
    "Recessed ceiling luminaires",
    "Surface ceiling luminares",
    "Surface wall luminaires",
    "1 circuit track system luminaires",
    "3 circuit track system luminaires",
    "Surface wall and ceiling luminaires",
    "Rope system luminaires",
    "Inground fittings",
    "Pendant lamps",
    "Recessed wall luminaires",
    "Floor lamps",
    "Table lamps",
    "Spike lights",
];

/// The luminaire category a query asks for.
///
/// `Unknown` is what a bare generic term ("Leuchte", "lamp") resolves to.
/// It is a valid extraction result but never selects a specific-type strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LuminaireType {
    Ceiling,
    Wall,
    Floor,
    Pendant,
    Table,
    Track,
    Outdoor,
    Inground,
    Unknown,
}

impl LuminaireType {
    /// Whether this type is actionable for type-specific routing.
    pub fn is_specific(self) -> bool {
        self != Self::Unknown
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ceiling => "ceiling",
            Self::Wall => "wall",
            Self::Floor => "floor",
            Self::Pendant => "pendant",
            Self::Table => "table",
            Self::Track => "track",
            Self::Outdoor => "outdoor",
            Self::Inground => "inground",
            Self::Unknown => "unknown",
        }
    }

    /// Catalog sub-category (`category_2`) values that hold this type.
    ///
    /// The misspelt "luminares" is how the catalog stores surface ceiling
    /// luminaires.
    pub fn catalog_categories(self) -> &'static [&'static str] {
        match self {
            Self::Ceiling => &[
                "Recessed ceiling luminaires",
                "Surface ceiling luminares",
                "Surface wall and ceiling luminaires",
            ],
            Self::Wall => &[
                "Surface wall luminaires",
                "Recessed wall luminaires",
                "Surface wall and ceiling luminaires",
            ],
            Self::Floor => &["Floor lamps"],
            Self::Pendant => &["Pendant lamps"],
            Self::Table => &["Table lamps"],
            Self::Track => &[
                "1 circuit track system luminaires",
                "3 circuit track system luminaires",
            ],
            Self::Outdoor => &["Inground fittings", "Spike lights"],
            Self::Inground => &["Inground fittings"],
            Self::Unknown => LUMINAIRE_CATEGORIES,
        }
    }

    /// Top-level category (`category_1`) that also holds this type, if any.
    pub fn catalog_top_category(self) -> Option<&'static str> {
        match self {
            Self::Outdoor => Some("Outdoor"),
            _ => None,
        }
    }
}

impl fmt::Display for LuminaireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LuminaireType {
    type Err = String;

    /// Parses English tags and the common German nouns.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ceiling" | "decke" | "deckenleuchte" => Ok(Self::Ceiling),
            "wall" | "wand" | "wandleuchte" => Ok(Self::Wall),
            "floor" | "stehleuchte" | "stehlampe" => Ok(Self::Floor),
            "pendant" | "pendelleuchte" => Ok(Self::Pendant),
            "table" | "tischleuchte" | "tischlampe" => Ok(Self::Table),
            "track" | "schienensystem" => Ok(Self::Track),
            "outdoor" | "außenleuchte" => Ok(Self::Outdoor),
            "inground" | "bodeneinbauleuchte" => Ok(Self::Inground),
            "unknown" | "generic" | "any" => Ok(Self::Unknown),
            other => Err(format!("unknown luminaire type '{other}'")),
        }
    }
}

/// Correlated colour temperature, restricted to the values the catalog carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Cct {
    K2700,
    K3000,
    K4000,
}

impl Cct {
    pub const ALL: [Cct; 3] = [Cct::K2700, Cct::K3000, Cct::K4000];

    pub fn kelvin(self) -> u32 {
        match self {
            Self::K2700 => 2700,
            Self::K3000 => 3000,
            Self::K4000 => 4000,
        }
    }

    /// `None` for anything outside the allow-list.
    pub fn from_kelvin(kelvin: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.kelvin() == kelvin)
    }
}

impl From<Cct> for u32 {
    fn from(cct: Cct) -> u32 {
        cct.kelvin()
    }
}

impl TryFrom<u32> for Cct {
    type Error = String;

    fn try_from(kelvin: u32) -> Result<Self, Self::Error> {
        Cct::from_kelvin(kelvin).ok_or_else(|| format!("{kelvin}K is not an offered CCT"))
    }
}

impl fmt::Display for Cct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}K", self.kelvin())
    }
}

/// Named SDCM quality bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdcmCategory {
    /// SDCM ≤ 3
    Premium,
    /// SDCM ≤ 4
    High,
    /// SDCM ≤ 5
    Good,
    /// SDCM ≤ 6
    Standard,
}

impl SdcmCategory {
    pub fn max_value(self) -> u8 {
        match self {
            Self::Premium => 3,
            Self::High => 4,
            Self::Good => 5,
            Self::Standard => 6,
        }
    }

    /// The tightest band an upper bound falls into.
    pub fn for_max(max: u8) -> Option<Self> {
        [Self::Premium, Self::High, Self::Good, Self::Standard]
            .into_iter()
            .find(|c| max <= c.max_value())
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Premium => "premium",
            Self::High => "hoch",
            Self::Good => "gut",
            Self::Standard => "standard",
        }
    }
}

/// A bound on SDCM (colour consistency). Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SdcmBound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<SdcmCategory>,
}

impl SdcmBound {
    pub fn at_most(max: u8) -> Self {
        Self {
            min: None,
            max: Some(max),
            category: SdcmCategory::for_max(max),
        }
    }

    pub fn at_least(min: u8) -> Self {
        Self {
            min: Some(min),
            max: None,
            category: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(min) = self.min {
            parts.push(format!("SDCM >= {min}"));
        }
        if let Some(max) = self.max {
            parts.push(format!("SDCM <= {max}"));
        }
        let mut text = parts.join(", ");
        if let Some(category) = self.category {
            text.push_str(&format!(" ({})", category.label()));
        }
        text
    }
}

/// The accumulating set of typed constraints extracted from one query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luminaire: Option<LuminaireType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cct: Option<Cct>,

    #[serde(default)]
    pub cct_switch: bool,

    /// Minimum ingress-protection code, e.g. "IP44".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_protection: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdcm: Option<SdcmBound>,

    #[serde(default)]
    pub led_strip: bool,

    #[serde(default)]
    pub dim_to_warm: bool,

    #[serde(default)]
    pub dimmable: bool,

    /// Normalised catalog housing colour, e.g. "White".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub housing_color: Option<String>,

    /// The query asks for the cheaper end of the range.
    #[serde(default)]
    pub cheaper: bool,

    /// Words no extractor consumed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual: Option<String>,
}

impl Criteria {
    /// The specific luminaire type, if one was extracted.
    pub fn specific_luminaire(&self) -> Option<LuminaireType> {
        self.luminaire.filter(|t| t.is_specific())
    }

    /// Whether any catalog-filtering constraint is set.
    ///
    /// The residual term and the price signal do not count: they shape the
    /// search or the selection, not the filter.
    pub fn has_constraints(&self) -> bool {
        self.luminaire.is_some()
            || self.cct.is_some()
            || self.cct_switch
            || self.min_protection.is_some()
            || self.sdcm.is_some_and(|b| !b.is_empty())
            || self.led_strip
            || self.dim_to_warm
            || self.dimmable
            || self.housing_color.is_some()
    }

    /// Human-readable filter trace, in a stable order.
    pub fn describe(&self) -> Vec<String> {
        let mut filters = Vec::new();
        if let Some(luminaire) = self.luminaire {
            if luminaire.is_specific() {
                filters.push(format!("luminaire type: {luminaire}"));
            } else {
                filters.push("luminaire type: any luminaire".to_string());
            }
        }
        if self.led_strip {
            filters.push("LED strip".to_string());
        }
        if self.dim_to_warm {
            filters.push("Dim to Warm (1800-3000K)".to_string());
        } else if self.dimmable {
            filters.push("dimmable".to_string());
        }
        if let Some(cct) = self.cct {
            filters.push(format!("CCT: {cct}"));
        }
        if self.cct_switch {
            filters.push("CCT switch capable".to_string());
        }
        if let Some(ip) = &self.min_protection {
            filters.push(format!("IP protection >= {ip}"));
        }
        if let Some(sdcm) = self.sdcm.filter(|b| !b.is_empty()) {
            filters.push(sdcm.describe());
        }
        if let Some(color) = &self.housing_color {
            filters.push(format!("housing color: {color}"));
        }
        filters
    }
}
