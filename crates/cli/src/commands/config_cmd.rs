//! `luxroute config`: Configuration management commands.

use luxroute_config::AppConfig;

pub async fn print_default() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::default_toml());
    Ok(())
}

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();
            if !config.has_api_key() {
                warnings.push("No API key set (set LUXROUTE_API_KEY or OPENROUTER_API_KEY env var)");
            }
            if !config.cache.enabled {
                warnings.push("Response cache disabled; every fast-path query hits the catalog");
            }
            if !config.catalog.path.exists() {
                warnings.push("Catalog database does not exist yet; run `luxroute import`");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Provider:  {}", config.default_provider);
            println!("   Model:     {}", config.default_model);
            println!("   Fallbacks: {}", config.reasoner.fallback_providers.join(", "));
            println!("   Timeout:   {}s", config.reasoner.timeout_secs);
            println!(
                "   Cache:     {} (ttl {}s)",
                if config.cache.enabled { "on" } else { "off" },
                config.cache.ttl_secs
            );
            println!("   Catalog:   {}", config.catalog.path.display());
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{config_path}", config_path = config_path.display());
    Ok(())
}
