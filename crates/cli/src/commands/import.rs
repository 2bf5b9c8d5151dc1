//! `luxroute import`: Load a JSON catalog export.

use luxroute_catalog::load_items_json;
use luxroute_config::AppConfig;
use luxroute_core::catalog::CatalogStore;
use std::path::Path;
use tracing::info;

pub async fn run(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("📦 Importing {}", file.display());
    let items = load_items_json(file).await?;
    let catalog = super::open_catalog(&config).await?;
    let written = catalog.insert_items(&items).await?;
    let total = catalog.count().await?;
    info!(written, total, path = %config.catalog.path.display(), "Catalog import finished");

    println!("   ✅ {written} items written");
    println!("   Catalog:  {}", config.catalog.path.display());
    println!("   Total:    {total} items");
    Ok(())
}
