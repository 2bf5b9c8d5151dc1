//! Catalog import from JSON exports.

use luxroute_core::catalog::CatalogItem;
use luxroute_core::error::CatalogError;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Deserialize)]
#[serde(untagged)]
enum Export {
    Items(Vec<CatalogItem>),
    Wrapped { products: Vec<CatalogItem> },
}

/// Parse a catalog export: either a bare array of items or
/// `{"products": [...]}`.
pub fn parse_items(json: &str) -> Result<Vec<CatalogItem>, CatalogError> {
    let export: Export = serde_json::from_str(json)
        .map_err(|e| CatalogError::InvalidData(format!("catalog JSON: {e}")))?;
    Ok(match export {
        Export::Items(items) | Export::Wrapped { products: items } => items,
    })
}

/// Read and parse a catalog export file.
pub async fn load_items_json(path: impl AsRef<Path>) -> Result<Vec<CatalogItem>, CatalogError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CatalogError::InvalidData(format!("{}: {e}", path.display())))?;
    let items = parse_items(&content)?;
    info!(count = items.len(), path = %path.display(), "Catalog export loaded");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array() {
        let items = parse_items(r#"[{"id": 7, "name": "Mezy Wall", "price": 79.0}]"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, Some(79.0));
        assert!(items[0].available);
    }

    #[test]
    fn parses_wrapped_products() {
        let json = r#"{"products": [
            {"id": 1, "name": "A", "available": false},
            {"id": 2, "name": "B", "category_2": "Pendant luminaires"}
        ]}"#;
        let items = parse_items(json).unwrap();
        assert_eq!(items.len(), 2);
        assert!(!items[0].available);
        assert_eq!(items[1].category_2.as_deref(), Some("Pendant luminaires"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_items("{\"items\": 3}"),
            Err(CatalogError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, r#"[{"id": 1, "name": "A"}]"#).unwrap();
        assert_eq!(load_items_json(&path).await.unwrap().len(), 1);
        assert!(load_items_json(dir.path().join("missing.json")).await.is_err());
    }
}
