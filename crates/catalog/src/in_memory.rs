//! In-memory catalog, useful for tests and small imported catalogs.

use async_trait::async_trait;
use luxroute_core::catalog::{CatalogItem, CatalogQuery, CatalogStore, OrderBy};
use luxroute_core::error::CatalogError;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A catalog held in a Vec, in insertion order.
pub struct InMemoryCatalog {
    items: Arc<RwLock<Vec<CatalogItem>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_items(items: Vec<CatalogItem>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Insert or replace items by id.
    pub async fn upsert(&self, new_items: Vec<CatalogItem>) -> usize {
        let mut items = self.items.write().await;
        let count = new_items.len();
        for item in new_items {
            match items.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => *existing = item,
                None => items.push(item),
            }
        }
        count
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn price_ascending(a: &CatalogItem, b: &CatalogItem) -> Ordering {
    match (a.price, b.price) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Order items the way the stores do. Stable, so ties keep catalog order.
pub fn sort_items(items: &mut [CatalogItem], order: OrderBy) {
    match order {
        OrderBy::PriceAsc => items.sort_by(price_ascending),
        OrderBy::NameAsc => items.sort_by_key(|i| i.name.to_lowercase()),
        OrderBy::AvailabilityThenPrice => items.sort_by(|a, b| {
            b.available
                .cmp(&a.available)
                .then_with(|| price_ascending(a, b))
        }),
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn query(&self, query: CatalogQuery) -> Result<Vec<CatalogItem>, CatalogError> {
        let items = self.items.read().await;
        let mut results: Vec<CatalogItem> =
            items.iter().filter(|i| query.matches(i)).cloned().collect();
        if let Some(order) = query.order {
            sort_items(&mut results, order);
        }
        results.truncate(query.limit);
        Ok(results)
    }

    async fn count(&self) -> Result<usize, CatalogError> {
        Ok(self.items.read().await.len())
    }
}
