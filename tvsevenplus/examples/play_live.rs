//! Example: Resolve a 7plus live channel
//!
//! Run with: cargo run -p tvsevenplus --example play_live
//! Or with a specific channel: cargo run -p tvsevenplus --example play_live -- 7two
//!
//! The bearer token and location are read from the tvaddons configuration
//! (`sources.sevenplus.token`, `sources.sevenplus.latitude/longitude`).

use std::env;
use tvconfig::get_config;
use tvsevenplus::SevenPlusClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let slug = env::args().nth(1).unwrap_or_else(|| "7mate".to_string());

    let config = get_config();
    let client = SevenPlusClient::builder()
        .with_config(&config)?
        .build()
        .await?;

    println!("Market: {}", client.market_id().await);
    println!("Resolving {}...\n", slug);

    match client.play_live(&slug).await {
        Ok(stream) => {
            println!("URL:      {}", stream.url);
            println!("Protocol: {:?}", stream.protocol);
            if let Some(license) = &stream.license_url {
                println!("License:  {}", license);
            }
        }
        Err(e) => match e.code() {
            Some(code) => println!("Playback refused: {}", code),
            None => return Err(e.into()),
        },
    }

    Ok(())
}
