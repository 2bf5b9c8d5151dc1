//! The fast-path dispatch table.
//!
//! An ordered list of `(pattern, predicate)` pairs. The first rule whose
//! predicate holds picks the fast-path pattern; no match means the
//! optimized tier.

use luxroute_core::route::{FastPattern, RoutingDecision, Tier};
use luxroute_extract::QuerySignals;

/// One fast-path rule.
pub struct FastRule {
    pub pattern: FastPattern,
    pub applies: fn(&QuerySignals) -> bool,
}

/// Fast-path rules in priority order.
pub const FAST_RULES: &[FastRule] = &[
    FastRule {
        pattern: FastPattern::ProductQuestion,
        applies: |s| s.product_question.is_some(),
    },
    FastRule {
        pattern: FastPattern::LedStrip,
        applies: |s| s.led_strip,
    },
    FastRule {
        pattern: FastPattern::CategoryOverview,
        applies: |s| s.overview.is_some(),
    },
    FastRule {
        pattern: FastPattern::DimToWarm,
        applies: |s| s.dim_to_warm,
    },
    FastRule {
        pattern: FastPattern::TypeWithCct,
        applies: |s| s.specific_luminaire().is_some() && (s.cct.is_some() || s.cct_switch),
    },
    FastRule {
        pattern: FastPattern::TypeOnly,
        applies: |s| s.specific_luminaire().is_some() && s.protection.is_none(),
    },
    FastRule {
        pattern: FastPattern::TypeWithProtection,
        applies: |s| s.specific_luminaire().is_some() && s.protection.is_some(),
    },
    FastRule {
        pattern: FastPattern::ProtectionOnly,
        applies: |s| s.protection.is_some() && s.luminaire_request,
    },
    FastRule {
        pattern: FastPattern::CannedAnswer,
        applies: |s| s.canned.is_some(),
    },
];

/// The first matching fast-path pattern, if any.
pub fn fast_pattern(signals: &QuerySignals) -> Option<FastPattern> {
    FAST_RULES
        .iter()
        .find(|rule| (rule.applies)(signals))
        .map(|rule| rule.pattern)
}

/// Pick the tier for a query.
pub fn decide(signals: &QuerySignals) -> RoutingDecision {
    let tier = fast_pattern(signals).map_or(Tier::Optimized, Tier::Fast);
    RoutingDecision::new(tier, signals.criteria())
}

#[cfg(test)]
mod tests {
    use super::*;
    use luxroute_extract::ProtectionVocabulary;

    fn pattern(text: &str) -> Option<FastPattern> {
        fast_pattern(&QuerySignals::extract(
            text,
            &[],
            &ProtectionVocabulary::default(),
        ))
    }

    #[test]
    fn rule_table_order_is_fixed() {
        let order: Vec<FastPattern> = FAST_RULES.iter().map(|r| r.pattern).collect();
        assert_eq!(
            order,
            vec![
                FastPattern::ProductQuestion,
                FastPattern::LedStrip,
                FastPattern::CategoryOverview,
                FastPattern::DimToWarm,
                FastPattern::TypeWithCct,
                FastPattern::TypeOnly,
                FastPattern::TypeWithProtection,
                FastPattern::ProtectionOnly,
                FastPattern::CannedAnswer,
            ]
        );
    }

    #[test]
    fn each_rule_is_reachable() {
        assert_eq!(pattern("ist Salsa Lid dimmbar?"), Some(FastPattern::ProductQuestion));
        assert_eq!(pattern("LED Strip 3000K"), Some(FastPattern::LedStrip));
        assert_eq!(pattern("welche Schienensysteme habt ihr?"), Some(FastPattern::CategoryOverview));
        assert_eq!(pattern("Deckenleuchte dim to warm"), Some(FastPattern::DimToWarm));
        assert_eq!(pattern("weiße Wandleuchte 3000K"), Some(FastPattern::TypeWithCct));
        assert_eq!(pattern("Pendelleuchte"), Some(FastPattern::TypeOnly));
        assert_eq!(pattern("Wandleuchte IP65"), Some(FastPattern::TypeWithProtection));
        assert_eq!(pattern("IP44 Leuchten"), Some(FastPattern::ProtectionOnly));
        assert_eq!(pattern("was ist IP44?"), Some(FastPattern::CannedAnswer));
    }

    #[test]
    fn product_question_beats_type_keywords() {
        assert_eq!(
            pattern("ist Mezy Wandleuchte dimmbar?"),
            Some(FastPattern::ProductQuestion)
        );
    }

    #[test]
    fn generic_term_never_selects_a_type_branch() {
        assert_eq!(pattern("Leuchte"), None);
        assert_eq!(pattern("Leuchte 3000K"), None);
    }

    #[test]
    fn bare_ip_code_is_not_protection_only() {
        assert_eq!(pattern("IP44"), None);
    }

    #[test]
    fn no_match_goes_optimized() {
        let signals = QuerySignals::extract("etwas Schönes fürs Wohnzimmer", &[], &ProtectionVocabulary::default());
        assert_eq!(decide(&signals).tier(), Tier::Optimized);
    }
}
