//! services/companion/src/bin/companion.rs

use companion_lib::{
    adapters::{ConsoleSink, ReqwestExchange},
    api::ApiClient,
    chat::{Conversation, Responder},
    config::Config,
    error::ClientError,
};
use dish_companion_core::DishAnalysis;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Starting companion...");

    // --- 2. Initialize the Backend Client ---
    let exchange = Arc::new(ReqwestExchange::new()?);
    let client = Arc::new(ApiClient::from_config(exchange, &config));
    if config.offline {
        info!("Offline mode: replies come from the local table.");
    } else {
        report_health(&client).await;
    }

    // --- 3. Build the Conversation ---
    let responder = if config.offline {
        Responder::offline()
    } else {
        Responder::backend(client.clone())
    };
    let conversation = Conversation::new(Arc::new(ConsoleSink::new()), responder)
        .with_timing(config.turn_timing)
        .with_location(config.location.clone());
    info!("Conversation {} ready.", conversation.id());
    println!("Describe a dish you'd like to find. Commands: /health, /analyze, /quit");

    // --- 4. Read Input Until EOF or /quit ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/health" => report_health(&client).await,
            "/analyze" => match client.analyze_dish().await {
                Ok(analysis) => println!("{}", describe(&analysis)),
                Err(failure) => warn!("Dish analysis failed: {} ({:?})", failure, failure.detail),
            },
            _ => match conversation.submit(&line).await {
                Ok(turn) => info!("Submitted {}.", turn.id()),
                Err(ClientError::Validation(e)) => warn!("{}", e),
                Err(e) => return Err(e),
            },
        }
    }

    conversation.close().await;
    info!("Companion stopped.");
    Ok(())
}

async fn report_health(client: &ApiClient) {
    match client.health_check().await {
        Ok(health) => info!(
            "Backend at {} is {}: {}",
            client.base_url(),
            health.status,
            health.message
        ),
        Err(failure) => warn!(
            "Backend at {} is unreachable: {} ({:?})",
            client.base_url(),
            failure,
            failure.detail
        ),
    }
}

fn describe(analysis: &DishAnalysis) -> String {
    let mut lines = vec![
        format!("{}: {}", analysis.dish_name, analysis.dish_description),
        format!("Taste: {}", analysis.taste_profile),
        format!("Ingredients: {}", analysis.ingredients.join(", ")),
    ];
    if !analysis.allergens.is_empty() {
        lines.push(format!("Allergens: {}", analysis.allergens.join(", ")));
    }
    if !analysis.dietary_tags.is_empty() {
        lines.push(format!("Dietary: {}", analysis.dietary_tags.join(", ")));
    }
    for similar in &analysis.similar_dishes {
        lines.push(format!(
            "Similar: {} ({:.0}%) {}",
            similar.dish_name,
            similar.similarity_score * 100.0,
            similar.similarity_reason
        ));
    }
    for warning in &analysis.warnings {
        lines.push(format!("Warning: {}", warning));
    }
    lines.join("\n")
}
