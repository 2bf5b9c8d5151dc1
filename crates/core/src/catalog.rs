//! Catalog domain types and the `CatalogStore` trait.
//!
//! The catalog is an external, read-only collaborator. The router talks to it
//! exclusively through well-typed predicates; stores translate them into
//! their own query language.

use crate::criteria::LUMINAIRE_CATEGORIES;
use crate::error::CatalogError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Top-level categories that never hold luminaires.
const NON_LUMINAIRE_TOP_CATEGORIES: &[&str] = &["Components", "Spare parts"];

/// Sub-categories that hold components and accessories.
const COMPONENT_CATEGORIES: &[&str] = &[
    "Electrical components",
    "Mechanical components",
    "Control devices",
    "Transformers",
    "Aluminum profiles",
    "LED strips single Colour",
    "LED strips multi color",
    "LED modules",
    "1 circuit track system components",
    "3 circuit track system components",
    "Rope system components",
];

/// Top-level categories that count as luminaires when the sub-category is unknown.
const GENERAL_LUMINAIRE_TOP_CATEGORIES: &[&str] = &["Indoor", "Outdoor", "LED bulb"];

/// A single catalog product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub item_number: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub category_1: Option<String>,
    #[serde(default)]
    pub category_2: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub housing_color: Option<String>,
    #[serde(default)]
    pub ingress_protection: Option<String>,
    #[serde(default)]
    pub cct: Option<u32>,
    /// Switchable CCT values as the catalog stores them, e.g. "2700/3000/4000".
    #[serde(default)]
    pub cct_switch: Option<String>,
    #[serde(default)]
    pub sdcm: Option<f64>,
    #[serde(default)]
    pub cri: Option<f64>,
    #[serde(default)]
    pub lumen: Option<f64>,
    #[serde(default)]
    pub wattage: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub operating_mode: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl CatalogItem {
    /// Whether this item is a real luminaire rather than a component or spare part.
    pub fn is_luminaire(&self) -> bool {
        let cat1 = self.category_1.as_deref();
        let cat2 = self.category_2.as_deref();

        if cat1.is_some_and(|c| NON_LUMINAIRE_TOP_CATEGORIES.contains(&c)) {
            return false;
        }
        if cat2.is_some_and(|c| COMPONENT_CATEGORIES.contains(&c)) {
            return false;
        }
        if cat2.is_some_and(|c| LUMINAIRE_CATEGORIES.contains(&c)) {
            return true;
        }
        cat1.is_some_and(|c| GENERAL_LUMINAIRE_TOP_CATEGORIES.contains(&c))
    }

    /// Whether the operating mode, name or short description marks it dimmable.
    pub fn is_dimmable(&self) -> bool {
        [
            self.operating_mode.as_deref(),
            Some(self.name.as_str()),
            self.short_description.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|text| {
            let lower = text.to_lowercase();
            (lower.contains("dimm") || lower.contains("dali") || lower.contains("1-10v"))
                && !lower.contains("nicht dimm")
                && !lower.contains("non-dimm")
        })
    }

    /// Short CCT summary: switch values if present, else the fixed value.
    pub fn cct_summary(&self) -> Option<String> {
        match (&self.cct_switch, self.cct) {
            (Some(switch), _) if !switch.trim().is_empty() => Some(format!("{}K", switch.trim())),
            (_, Some(kelvin)) => Some(format!("{kelvin}K")),
            _ => None,
        }
    }

    /// Text value of a field; `None` for numeric fields and missing values.
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => Some(self.name.as_str()),
            Field::ItemNumber => self.item_number.as_deref(),
            Field::ShortDescription => self.short_description.as_deref(),
            Field::LongDescription => self.long_description.as_deref(),
            Field::Category1 => self.category_1.as_deref(),
            Field::Category2 => self.category_2.as_deref(),
            Field::GroupName => self.group_name.as_deref(),
            Field::HousingColor => self.housing_color.as_deref(),
            Field::IngressProtection => self.ingress_protection.as_deref(),
            Field::CctSwitch => self.cct_switch.as_deref(),
            Field::OperatingMode => self.operating_mode.as_deref(),
            Field::Cct
            | Field::Sdcm
            | Field::Cri
            | Field::Lumen
            | Field::Wattage
            | Field::Price
            | Field::Available => None,
        }
    }

    /// Numeric value of a field; `None` for text fields and missing values.
    pub fn number(&self, field: Field) -> Option<f64> {
        match field {
            Field::Cct => self.cct.map(f64::from),
            Field::Sdcm => self.sdcm,
            Field::Cri => self.cri,
            Field::Lumen => self.lumen,
            Field::Wattage => self.wattage,
            Field::Price => self.price,
            Field::Available => Some(if self.available { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

/// The closed set of attributes predicates may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    ItemNumber,
    ShortDescription,
    LongDescription,
    Category1,
    Category2,
    GroupName,
    HousingColor,
    IngressProtection,
    Cct,
    CctSwitch,
    Sdcm,
    Cri,
    Lumen,
    Wattage,
    Price,
    OperatingMode,
    Available,
}

impl Field {
    pub fn is_text(self) -> bool {
        !matches!(
            self,
            Self::Cct
                | Self::Sdcm
                | Self::Cri
                | Self::Lumen
                | Self::Wattage
                | Self::Price
                | Self::Available
        )
    }
}

/// A literal compared against a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A single filter condition. A query is the conjunction of its predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Eq { field: Field, value: Value },
    In { field: Field, values: Vec<Value> },
    /// Missing values pass.
    NotIn { field: Field, values: Vec<Value> },
    Gte { field: Field, value: f64 },
    Lte { field: Field, value: f64 },
    /// Case-insensitive substring match on a text field.
    Contains { field: Field, needle: String },
    /// Missing values pass.
    NotContains { field: Field, needle: String },
    /// Missing or empty.
    IsNull { field: Field },
    /// Present and non-empty.
    NotNull { field: Field },
    /// Disjunction. An empty group matches nothing.
    AnyOf { predicates: Vec<Predicate> },
}

impl Predicate {
    pub fn eq(field: Field, value: impl Into<Value>) -> Self {
        Self::Eq {
            field,
            value: value.into(),
        }
    }

    pub fn one_of<V: Into<Value>>(field: Field, values: impl IntoIterator<Item = V>) -> Self {
        Self::In {
            field,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn none_of<V: Into<Value>>(field: Field, values: impl IntoIterator<Item = V>) -> Self {
        Self::NotIn {
            field,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(field: Field, needle: impl Into<String>) -> Self {
        Self::Contains {
            field,
            needle: needle.into(),
        }
    }

    pub fn not_contains(field: Field, needle: impl Into<String>) -> Self {
        Self::NotContains {
            field,
            needle: needle.into(),
        }
    }

    pub fn any_of(predicates: Vec<Predicate>) -> Self {
        Self::AnyOf { predicates }
    }

    pub fn available() -> Self {
        Self::eq(Field::Available, true)
    }

    /// Reference semantics. Every store must agree with this evaluation.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        match self {
            Self::Eq { field, value } => value_equals(item, *field, value),
            Self::In { field, values } => values.iter().any(|v| value_equals(item, *field, v)),
            Self::NotIn { field, values } => {
                is_missing(item, *field) || !values.iter().any(|v| value_equals(item, *field, v))
            }
            Self::Gte { field, value } => item.number(*field).is_some_and(|n| n >= *value),
            Self::Lte { field, value } => item.number(*field).is_some_and(|n| n <= *value),
            Self::Contains { field, needle } => item
                .text(*field)
                .is_some_and(|t| t.to_lowercase().contains(&needle.to_lowercase())),
            Self::NotContains { field, needle } => !item
                .text(*field)
                .is_some_and(|t| t.to_lowercase().contains(&needle.to_lowercase())),
            Self::IsNull { field } => is_missing(item, *field),
            Self::NotNull { field } => !is_missing(item, *field),
            Self::AnyOf { predicates } => predicates.iter().any(|p| p.matches(item)),
        }
    }
}

fn is_missing(item: &CatalogItem, field: Field) -> bool {
    if field.is_text() {
        item.text(field).is_none_or(|t| t.is_empty())
    } else {
        item.number(field).is_none()
    }
}

fn value_equals(item: &CatalogItem, field: Field, value: &Value) -> bool {
    match value {
        Value::Text(expected) => item.text(field).is_some_and(|t| t == expected),
        Value::Number(expected) => item
            .number(field)
            .is_some_and(|n| (n - expected).abs() < f64::EPSILON),
        Value::Bool(expected) => match field {
            Field::Available => item.available == *expected,
            _ => false,
        },
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    /// Cheapest first, unpriced items last.
    PriceAsc,
    NameAsc,
    /// Available items first, then cheapest first.
    AvailabilityThenPrice,
}

/// A bounded, optionally ordered predicate query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub predicates: Vec<Predicate>,
    pub order: Option<OrderBy>,
    pub limit: usize,
}

impl CatalogQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            predicates: Vec::new(),
            order: None,
            limit,
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn filters(mut self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        self.predicates.iter().all(|p| p.matches(item))
    }
}

/// Number of items sharing one value of a grouped field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Upper bound on rows scanned by the default `count_by`.
pub const COUNT_SCAN_LIMIT: usize = 100_000;

/// The read-only catalog store.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Store name for logs (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Run a predicate query.
    async fn query(&self, query: CatalogQuery) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Grouped counts of `field` over items matching `predicates`,
    /// largest group first.
    async fn count_by(
        &self,
        field: Field,
        predicates: Vec<Predicate>,
    ) -> Result<Vec<CategoryCount>, CatalogError> {
        let items = self
            .query(CatalogQuery::new(COUNT_SCAN_LIMIT).filters(predicates))
            .await?;
        Ok(group_counts(items.iter().filter_map(|i| i.text(field))))
    }

    /// Total number of items.
    async fn count(&self) -> Result<usize, CatalogError>;

    /// Health check: can we reach the store?
    async fn health_check(&self) -> Result<bool, CatalogError> {
        Ok(true)
    }
}

/// Group and count values, largest group first, ties by name.
pub fn group_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<CategoryCount> {
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for value in values.filter(|v| !v.is_empty()) {
        *counts.entry(value).or_default() += 1;
    }
    let mut grouped: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_string(),
            count,
        })
        .collect();
    grouped.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp() -> CatalogItem {
        CatalogItem {
            id: 1,
            name: "Mezy Wall".into(),
            category_1: Some("Indoor".into()),
            category_2: Some("Surface wall luminaires".into()),
            housing_color: Some("White".into()),
            ingress_protection: Some("IP44".into()),
            cct: Some(3000),
            price: Some(79.0),
            operating_mode: Some("Phase-cut dimmable".into()),
            available: true,
            ..CatalogItem::default()
        }
    }

    #[test]
    fn luminaire_classification() {
        assert!(lamp().is_luminaire());

        let driver = CatalogItem {
            category_1: Some("Components".into()),
            category_2: Some("Transformers".into()),
            ..lamp()
        };
        assert!(!driver.is_luminaire());

        let bulb = CatalogItem {
            category_1: Some("LED bulb".into()),
            category_2: None,
            ..lamp()
        };
        assert!(bulb.is_luminaire());
    }

    #[test]
    fn contains_is_case_insensitive() {
        assert!(Predicate::contains(Field::Name, "mezy").matches(&lamp()));
        assert!(!Predicate::contains(Field::Name, "salsa").matches(&lamp()));
    }

    #[test]
    fn not_in_passes_missing_values() {
        let item = CatalogItem {
            category_2: None,
            ..lamp()
        };
        assert!(Predicate::none_of(Field::Category2, ["Transformers"]).matches(&item));
        assert!(!Predicate::none_of(Field::Category2, ["Surface wall luminaires"]).matches(&lamp()));
    }

    #[test]
    fn numeric_predicates() {
        assert!(Predicate::eq(Field::Cct, 3000u32).matches(&lamp()));
        assert!(Predicate::Lte { field: Field::Price, value: 80.0 }.matches(&lamp()));
        assert!(!Predicate::Gte { field: Field::Lumen, value: 1.0 }.matches(&lamp()));
    }

    #[test]
    fn empty_any_of_matches_nothing() {
        assert!(!Predicate::any_of(vec![]).matches(&lamp()));
    }

    #[test]
    fn not_null_rejects_empty_text() {
        let item = CatalogItem {
            cct_switch: Some(String::new()),
            ..lamp()
        };
        assert!(!Predicate::NotNull { field: Field::CctSwitch }.matches(&item));
        assert!(Predicate::IsNull { field: Field::CctSwitch }.matches(&item));
    }

    #[test]
    fn dimmable_and_cct_summary() {
        assert!(lamp().is_dimmable());
        assert_eq!(lamp().cct_summary().as_deref(), Some("3000K"));

        let switchable = CatalogItem {
            cct_switch: Some("2700/3000/4000".into()),
            operating_mode: Some("On/Off".into()),
            ..lamp()
        };
        assert_eq!(switchable.cct_summary().as_deref(), Some("2700/3000/4000K"));
        assert!(!switchable.is_dimmable());
    }

    #[test]
    fn group_counts_sorted_by_size() {
        let grouped = group_counts(["b", "a", "b", "", "c", "b", "a"].into_iter());
        assert_eq!(grouped[0], CategoryCount { name: "b".into(), count: 3 });
        assert_eq!(grouped[1].name, "a");
        assert_eq!(grouped.len(), 3);
    }
}
