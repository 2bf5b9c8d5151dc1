pub mod ask;
pub mod chat;
pub mod config_cmd;
pub mod doctor;
pub mod import;

use luxroute_catalog::SqliteCatalog;
use luxroute_config::AppConfig;
use luxroute_router::TieredRouter;
use std::sync::Arc;

/// Open the configured SQLite catalog, creating its directory if needed.
pub async fn open_catalog(config: &AppConfig) -> Result<SqliteCatalog, Box<dyn std::error::Error>> {
    if let Some(parent) = config.catalog.path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let path = config.catalog.path.to_string_lossy();
    Ok(SqliteCatalog::new(&path).await?)
}

/// Wire a router over the configured catalog and provider chain.
pub async fn build_router(config: &AppConfig) -> Result<TieredRouter, Box<dyn std::error::Error>> {
    if !config.has_api_key() {
        eprintln!("  ⚠️  No API key configured; only template answers will work.");
        eprintln!("     Set LUXROUTE_API_KEY, OPENROUTER_API_KEY or OPENAI_API_KEY.");
    }
    let catalog = Arc::new(open_catalog(config).await?);
    let provider = luxroute_providers::build_from_config(config);
    Ok(TieredRouter::from_config(config, catalog, provider)?)
}
