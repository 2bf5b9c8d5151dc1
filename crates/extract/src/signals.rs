//! All extractor results for one query, evaluated in a fixed order.

use crate::canned::{CannedTopic, canned_topic};
use crate::cct::{cct_switch, cct_value};
use crate::dimming::{dim_to_warm, dimmable};
use crate::luminaire::{is_luminaire_request, luminaire_type};
use crate::overview::{OverviewRequest, category_overview};
use crate::preferences::{cheaper, housing_color, residual_term};
use crate::product_question::{ProductQuestion, product_question};
use crate::protection::{ProtectionHint, ProtectionVocabulary, protection_hint};
use crate::sdcm::sdcm_bound;
use crate::strip::{connector_request, led_strip};
use luxroute_core::{Cct, Criteria, LuminaireType, SdcmBound};
use serde::Serialize;

/// Extractor output for one query.
///
/// Attribute signals look at the query first and fall back to the relevant
/// context; the query's own value always wins. Intent signals (overview,
/// canned topic, luminaire intent, price preference, residual) come from the
/// query alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuerySignals {
    pub product_question: Option<ProductQuestion>,
    pub led_strip: bool,
    pub connector_request: bool,
    pub overview: Option<OverviewRequest>,
    pub luminaire: Option<LuminaireType>,
    pub cct: Option<Cct>,
    pub cct_switch: bool,
    pub dim_to_warm: bool,
    pub dimmable: bool,
    pub protection: Option<ProtectionHint>,
    pub sdcm: Option<SdcmBound>,
    pub housing_color: Option<String>,
    pub luminaire_request: bool,
    pub canned: Option<CannedTopic>,
    pub cheaper: bool,
    pub residual: Option<String>,
}

impl QuerySignals {
    /// Run every extractor over `text`, consulting `context` (the relevant
    /// prior turns) for attribute signals the text leaves open.
    ///
    /// A named-product question short-circuits: it is about one product, so
    /// nothing from the context may leak into it.
    pub fn extract(text: &str, context: &[String], vocabulary: &ProtectionVocabulary) -> Self {
        if let Some(question) = product_question(text) {
            return Self {
                product_question: Some(question),
                cheaper: cheaper(text),
                ..Self::default()
            };
        }

        let context = context.join(" ");
        let has_context = !context.trim().is_empty();
        let either = |f: fn(&str) -> bool| f(text) || (has_context && f(&context));

        Self {
            product_question: None,
            led_strip: either(led_strip),
            connector_request: connector_request(text),
            overview: category_overview(text),
            luminaire: luminaire_type(text).or_else(|| {
                has_context
                    .then(|| luminaire_type(&context))
                    .flatten()
            }),
            cct: cct_value(text).or_else(|| has_context.then(|| cct_value(&context)).flatten()),
            cct_switch: either(cct_switch),
            dim_to_warm: either(dim_to_warm),
            dimmable: either(dimmable),
            protection: protection_hint(text, vocabulary).or_else(|| {
                has_context
                    .then(|| protection_hint(&context, vocabulary))
                    .flatten()
            }),
            sdcm: sdcm_bound(text).or_else(|| has_context.then(|| sdcm_bound(&context)).flatten()),
            housing_color: housing_color(text)
                .or_else(|| has_context.then(|| housing_color(&context)).flatten())
                .map(str::to_string),
            luminaire_request: is_luminaire_request(text),
            canned: canned_topic(text),
            cheaper: cheaper(text),
            residual: residual_term(text),
        }
    }

    pub fn specific_luminaire(&self) -> Option<LuminaireType> {
        self.luminaire.filter(|t| t.is_specific())
    }

    /// The typed criteria these signals describe.
    pub fn criteria(&self) -> Criteria {
        Criteria {
            luminaire: self.luminaire,
            cct: self.cct,
            cct_switch: self.cct_switch,
            min_protection: self.protection.as_ref().map(|p| p.code.clone()),
            sdcm: self.sdcm,
            led_strip: self.led_strip,
            dim_to_warm: self.dim_to_warm,
            dimmable: self.dimmable || self.dim_to_warm,
            housing_color: self.housing_color.clone(),
            cheaper: self.cheaper,
            residual: self.residual.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product_question::QuestionKind;

    fn extract(text: &str, context: &[&str]) -> QuerySignals {
        let context: Vec<String> = context.iter().map(|s| s.to_string()).collect();
        QuerySignals::extract(text, &context, &ProtectionVocabulary::default())
    }

    #[test]
    fn scenario_white_wall_light() {
        let s = extract("weiße Wandleuchte 3000K", &[]);
        assert_eq!(s.luminaire, Some(LuminaireType::Wall));
        assert_eq!(s.cct, Some(Cct::K3000));
        assert_eq!(s.housing_color.as_deref(), Some("White"));
        assert_eq!(s.residual.as_deref(), Some("weiße"));
        assert!(s.product_question.is_none());
    }

    #[test]
    fn product_question_ignores_context() {
        let s = extract("ist Salsa Lid dimmbar?", &["Wandleuchte 3000K IP44"]);
        let q = s.product_question.clone().unwrap();
        assert_eq!(q.name, "Salsa Lid");
        assert_eq!(q.kind, QuestionKind::Dimmable);
        assert_eq!(s.luminaire, None);
        assert_eq!(s.cct, None);
        assert_eq!(s.protection, None);
    }

    #[test]
    fn text_wins_over_context() {
        let s = extract("lieber 2700K", &["Wandleuchte 3000K"]);
        assert_eq!(s.cct, Some(Cct::K2700));
        assert_eq!(s.luminaire, Some(LuminaireType::Wall));
    }

    #[test]
    fn intent_signals_ignore_context() {
        let s = extract("IP44", &["ich suche Leuchten"]);
        assert_eq!(s.protection.as_ref().map(|p| p.code.as_str()), Some("IP44"));
        assert!(!s.luminaire_request);
    }

    #[test]
    fn criteria_mirror_signals() {
        let s = extract("dim to warm Deckenleuchte für draußen", &[]);
        let c = s.criteria();
        assert!(c.dim_to_warm);
        assert!(c.dimmable);
        assert_eq!(c.luminaire, Some(LuminaireType::Ceiling));
        assert_eq!(c.min_protection.as_deref(), Some("IP44"));
    }
}
