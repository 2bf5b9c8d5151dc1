//! Catalog query builders, one per routing strategy.
//!
//! Everything here is pure: criteria in, [`CatalogQuery`] out. The router
//! decides which builder to run and with which limit.

use luxroute_core::catalog::{CatalogItem, CatalogQuery, Field, OrderBy, Predicate};
use luxroute_core::criteria::{Criteria, LUMINAIRE_CATEGORIES, LuminaireType};
use luxroute_core::reasoner::FilterSpec;
use luxroute_extract::ip;

/// Names of strip accessories excluded from a plain strip search.
const STRIP_ACCESSORY_NAMES: &[&str] = &[
    "connector",
    "verbinder",
    "feedin",
    "strip2strip",
    "flex connector",
];

/// Sub-categories holding strip accessories.
const STRIP_ACCESSORY_CATEGORIES: &[&str] = &["Electrical components", "Mechanical components"];

/// Fields a free-text search looks at.
const TEXT_SEARCH_FIELDS: &[Field] = &[
    Field::Name,
    Field::ShortDescription,
    Field::LongDescription,
    Field::ItemNumber,
    Field::Category1,
    Field::Category2,
    Field::GroupName,
];

fn luminaire_predicate(kind: LuminaireType) -> Predicate {
    let categories = Predicate::one_of(Field::Category2, kind.catalog_categories().iter().copied());
    match kind.catalog_top_category() {
        Some(top) => Predicate::any_of(vec![categories, Predicate::eq(Field::Category1, top)]),
        None => categories,
    }
}

fn cct_predicate(kelvin: u32) -> Predicate {
    Predicate::any_of(vec![
        Predicate::eq(Field::Cct, kelvin),
        Predicate::contains(Field::CctSwitch, kelvin.to_string()),
    ])
}

fn dim_to_warm_predicate() -> Predicate {
    Predicate::any_of(vec![
        Predicate::contains(Field::CctSwitch, "1800"),
        Predicate::contains(Field::Name, "dim to warm"),
        Predicate::contains(Field::ShortDescription, "dim to warm"),
    ])
}

fn dimmable_predicate() -> Predicate {
    Predicate::any_of(vec![
        Predicate::contains(Field::Name, "dimm"),
        Predicate::contains(Field::ShortDescription, "dimm"),
        Predicate::contains(Field::OperatingMode, "dimm"),
        Predicate::contains(Field::OperatingMode, "dali"),
    ])
}

fn protection_predicate(min_code: &str) -> Predicate {
    Predicate::one_of(Field::IngressProtection, ip::sufficient_classes(min_code))
}

/// Predicates for every constraint the criteria carry.
///
/// A generic luminaire request restricts to luminaire sub-categories;
/// LED strips are handled by [`led_strip_query`] and not repeated here.
pub fn criteria_predicates(criteria: &Criteria) -> Vec<Predicate> {
    let mut predicates = Vec::new();
    if let Some(kind) = criteria.luminaire {
        predicates.push(luminaire_predicate(kind));
    }
    if let Some(cct) = criteria.cct {
        predicates.push(cct_predicate(cct.kelvin()));
    }
    if criteria.cct_switch {
        predicates.push(Predicate::NotNull {
            field: Field::CctSwitch,
        });
    }
    if let Some(code) = &criteria.min_protection {
        predicates.push(protection_predicate(code));
    }
    if let Some(bound) = criteria.sdcm {
        if let Some(max) = bound.max {
            predicates.push(Predicate::Lte {
                field: Field::Sdcm,
                value: f64::from(max),
            });
        }
        if let Some(min) = bound.min {
            predicates.push(Predicate::Gte {
                field: Field::Sdcm,
                value: f64::from(min),
            });
        }
    }
    if criteria.dim_to_warm {
        predicates.push(dim_to_warm_predicate());
    } else if criteria.dimmable {
        predicates.push(dimmable_predicate());
    }
    if let Some(color) = &criteria.housing_color {
        predicates.push(Predicate::eq(Field::HousingColor, color.as_str()));
    }
    predicates
}

/// Candidates for a named product: substring match on name, description or
/// item number.
pub fn product_lookup(name: &str, limit: usize) -> CatalogQuery {
    CatalogQuery::new(limit)
        .filter(Predicate::any_of(vec![
            Predicate::contains(Field::Name, name),
            Predicate::contains(Field::ShortDescription, name),
            Predicate::contains(Field::ItemNumber, name),
        ]))
        .filter(Predicate::available())
}

/// Second attempt for a named product: every word must occur in the name.
/// `None` for a name with fewer than two words, where it adds nothing.
pub fn product_lookup_by_words(name: &str, limit: usize) -> Option<CatalogQuery> {
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.len() < 2 {
        return None;
    }
    Some(
        CatalogQuery::new(limit)
            .filters(words.into_iter().map(|w| Predicate::contains(Field::Name, w)))
            .filter(Predicate::available()),
    )
}

/// The best candidate for `name`: exact match, then prefix, then the first.
pub fn best_name_match<'a>(name: &str, candidates: &'a [CatalogItem]) -> Option<&'a CatalogItem> {
    let wanted = name.trim().to_lowercase();
    candidates
        .iter()
        .find(|item| item.name.to_lowercase() == wanted)
        .or_else(|| {
            candidates
                .iter()
                .find(|item| item.name.to_lowercase().starts_with(&wanted))
        })
        .or_else(|| candidates.first())
}

/// LED strips, cheapest first.
pub fn led_strip_query(criteria: &Criteria, connectors: bool, limit: usize) -> CatalogQuery {
    let mut query = CatalogQuery::new(limit).filter(Predicate::any_of(vec![
        Predicate::contains(Field::Category2, "LED strips"),
        Predicate::contains(Field::GroupName, "LED Strip"),
    ]));
    if !connectors {
        query = query
            .filters(
                STRIP_ACCESSORY_NAMES
                    .iter()
                    .map(|n| Predicate::not_contains(Field::Name, *n)),
            )
            .filter(Predicate::none_of(
                Field::Category2,
                STRIP_ACCESSORY_CATEGORIES.iter().copied(),
            ));
    }
    if let Some(cct) = criteria.cct {
        query = query.filter(cct_predicate(cct.kelvin()));
    }
    if criteria.dim_to_warm {
        query = query.filter(Predicate::any_of(vec![
            Predicate::contains(Field::Name, "dim to warm"),
            Predicate::contains(Field::ShortDescription, "dim to warm"),
            Predicate::contains(Field::CctSwitch, "1800"),
        ]));
    } else if criteria.dimmable {
        query = query.filter(Predicate::any_of(vec![
            Predicate::contains(Field::Name, "dimm"),
            Predicate::contains(Field::ShortDescription, "dimm"),
            Predicate::contains(Field::OperatingMode, "dimm"),
        ]));
    }
    query
        .filter(Predicate::available())
        .order_by(OrderBy::PriceAsc)
}

/// Dim-to-warm luminaires, narrowed by type, protection and colour if given.
pub fn dim_to_warm_query(criteria: &Criteria, limit: usize) -> CatalogQuery {
    let mut query = CatalogQuery::new(limit).filter(dim_to_warm_predicate());
    if let Some(kind) = criteria.specific_luminaire() {
        query = query.filter(luminaire_predicate(kind));
    }
    if let Some(code) = &criteria.min_protection {
        query = query.filter(protection_predicate(code));
    }
    if let Some(color) = &criteria.housing_color {
        query = query.filter(Predicate::eq(Field::HousingColor, color.as_str()));
    }
    query.filter(Predicate::available())
}

/// Available luminaires of one type with the criteria's CCT, protection
/// and colour.
pub fn type_query(criteria: &Criteria, limit: usize) -> CatalogQuery {
    CatalogQuery::new(limit)
        .filters(criteria_predicates(criteria))
        .filter(Predicate::available())
}

/// Available items of at least `min_code` protection, cheapest first.
/// Callers drop non-luminaires from the result.
pub fn protection_query(min_code: &str, limit: usize) -> CatalogQuery {
    CatalogQuery::new(limit)
        .filter(protection_predicate(min_code))
        .filter(Predicate::available())
        .order_by(OrderBy::PriceAsc)
}

/// Sub-category filter for a category overview.
pub fn overview_predicates(circuit: Option<&str>, tracks_only: bool) -> Vec<Predicate> {
    let categories: Vec<&str> = match (circuit, tracks_only) {
        (Some(circuit), _) => vec![circuit],
        (None, true) => LuminaireType::Track.catalog_categories().to_vec(),
        (None, false) => LUMINAIRE_CATEGORIES.to_vec(),
    };
    vec![
        Predicate::one_of(Field::Category2, categories),
        Predicate::available(),
    ]
}

/// Free-text search for `term` across names, descriptions and categories.
pub fn text_search_query(term: &str, limit: usize) -> CatalogQuery {
    CatalogQuery::new(limit)
        .filter(Predicate::any_of(
            TEXT_SEARCH_FIELDS
                .iter()
                .map(|f| Predicate::contains(*f, term))
                .collect(),
        ))
        .filter(Predicate::available())
}

/// The direct query of the optimized tier.
pub fn direct_query(criteria: &Criteria, limit: usize) -> CatalogQuery {
    CatalogQuery::new(limit)
        .filters(criteria_predicates(criteria))
        .filter(Predicate::available())
}

/// The query for model-generated filters. A broad spec becomes
/// "anything available, in stock first, cheapest first".
pub fn fallback_query(spec: &FilterSpec, limit: usize) -> CatalogQuery {
    let mut query = CatalogQuery::new(limit);
    if !spec.broad {
        query = query.filters(criteria_predicates(&spec.criteria));
        if spec.criteria.led_strip {
            query = query.filter(Predicate::any_of(vec![
                Predicate::contains(Field::Category2, "LED strips"),
                Predicate::contains(Field::GroupName, "LED Strip"),
            ]));
        }
        if let Some(term) = spec.search_term.as_deref().filter(|t| !t.trim().is_empty()) {
            query = query.filter(Predicate::any_of(
                [Field::Name, Field::ShortDescription, Field::LongDescription]
                    .iter()
                    .map(|f| Predicate::contains(*f, term.trim()))
                    .collect(),
            ));
        }
    }
    query
        .filter(Predicate::available())
        .order_by(OrderBy::AvailabilityThenPrice)
}
