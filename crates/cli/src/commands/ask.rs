//! `luxroute ask`: Route a single query.

use luxroute_config::AppConfig;
use luxroute_core::route::RouteResponse;

pub async fn run(
    text: &str,
    context: Vec<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let router = super::build_router(&config).await?;

    let response = match router.route(text, &context).await {
        Ok(response) => response,
        Err(e) => e.to_response(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }
    Ok(())
}

/// Human-readable rendering shared with `chat`.
pub fn print_response(response: &RouteResponse) {
    println!();
    println!("  {}", response.answer.replace('\n', "\n  "));

    if !response.items.is_empty() {
        println!();
        for item in &response.items {
            let price = item
                .price
                .map(|p| format!("{p:.2} €"))
                .unwrap_or_else(|| "auf Anfrage".into());
            let number = item.item_number.as_deref().unwrap_or("-");
            println!("   • {} ({number}) — {price}", item.name);
        }
        if response.total_matches > response.items.len() {
            println!(
                "   … {} von {} Treffern",
                response.items.len(),
                response.total_matches
            );
        }
    }

    if !response.follow_ups.is_empty() {
        println!();
        for prompt in &response.follow_ups {
            println!("   → {prompt}");
        }
    }

    println!();
    let cached = if response.cached { ", cached" } else { "" };
    println!("   [{}{cached}]", response.path_taken);
    if !response.applied_filters.is_empty() {
        println!("   filters: {}", response.applied_filters.join("; "));
    }
}
