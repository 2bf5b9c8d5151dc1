//! Display selection applied to every path's candidates.

use luxroute_catalog::sort_items;
use luxroute_core::catalog::{CatalogItem, OrderBy};

/// How many candidates are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayLimits {
    pub display: usize,
    /// Applies when the query asks for cheaper items.
    pub cheap_display: usize,
}

impl Default for DisplayLimits {
    fn default() -> Self {
        Self {
            display: 8,
            cheap_display: 6,
        }
    }
}

/// Trim candidates to the display budget.
///
/// With a price signal the cheapest `cheap_display` items are kept
/// (unpriced last), otherwise the first `display` in catalog order.
/// Returns the shown items and the number of candidates before trimming.
pub fn select(
    mut items: Vec<CatalogItem>,
    cheaper: bool,
    limits: DisplayLimits,
) -> (Vec<CatalogItem>, usize) {
    let total = items.len();
    if cheaper {
        sort_items(&mut items, OrderBy::PriceAsc);
        items.truncate(limits.cheap_display);
    } else {
        items.truncate(limits.display);
    }
    (items, total)
}
