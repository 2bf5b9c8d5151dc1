//! `luxroute chat`: Interactive session.

use luxroute_config::AppConfig;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// User turns kept as session context.
const SESSION_TURNS: usize = 3;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let router = super::build_router(&config).await?;

    let sweeper = router.cache().map(|cache| {
        cache
            .clone()
            .spawn_sweeper(Duration::from_secs(config.cache.sweep_interval_secs))
    });

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        luxroute — Interactive Session        ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Catalog:   {}", config.catalog.path.display());
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut turns: Vec<String> = Vec::new();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if matches!(text, "exit" | "quit") {
            break;
        }

        let response = match router.route(text, &turns).await {
            Ok(response) => response,
            Err(e) => e.to_response(),
        };
        super::ask::print_response(&response);

        turns.push(text.to_string());
        if turns.len() > SESSION_TURNS {
            turns.remove(0);
        }
        debug!(turns = turns.len(), "Session context updated");
    }

    if let Some(handle) = sweeper {
        handle.abort();
    }
    println!("  Bye!");
    Ok(())
}
