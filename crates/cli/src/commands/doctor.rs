//! `luxroute doctor`: Diagnose system health.

use luxroute_config::AppConfig;
use luxroute_core::catalog::CatalogStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 luxroute Doctor — System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    let config = match AppConfig::load() {
        Ok(config) => {
            if config_path.exists() {
                println!("  ✅ Config file valid");
            } else {
                println!("  ⚠️  No config file, using defaults ({})", config_path.display());
            }
            config
        }
        Err(e) => {
            println!("  ❌ Config file invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    let vocabulary = config.extract.protection_vocabulary()?;
    println!(
        "  ✅ Protection vocabulary: {} keywords",
        vocabulary.entries().count()
    );

    match super::open_catalog(&config).await {
        Ok(catalog) => match catalog.count().await {
            Ok(0) => {
                println!("  ⚠️  Catalog is empty — run `luxroute import <file.json>`");
                issues += 1;
            }
            Ok(count) => println!("  ✅ Catalog reachable: {count} items"),
            Err(e) => {
                println!("  ❌ Catalog query failed: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Catalog unavailable: {e}");
            issues += 1;
        }
    }

    if config.has_api_key() {
        println!("  ✅ API key configured");
        let provider = luxroute_providers::build_from_config(&config);
        match provider.health_check().await {
            Ok(true) => println!("  ✅ Provider '{}' reachable", provider.name()),
            Ok(false) => {
                println!("  ⚠️  Provider '{}' answered but reports unhealthy", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                issues += 1;
            }
        }
    } else {
        println!("  ⚠️  No API key configured — set LUXROUTE_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
