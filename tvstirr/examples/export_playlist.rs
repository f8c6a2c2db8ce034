//! Example: Export the Stirr channels as an M3U playlist
//!
//! Run with: cargo run -p tvstirr --example export_playlist
//! Or with an output file: cargo run -p tvstirr --example export_playlist -- stirr.m3u8

use std::env;
use tvconfig::get_config;
use tvstirr::{RegionCode, StirrClient, StirrSource};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let output = env::args()
        .nth(1)
        .unwrap_or_else(|| "stirr.m3u8".to_string());

    let source = StirrSource::from_config(StirrClient::new()?, get_config())?;

    let index = source.live_tv(&RegionCode::All, None).await?;
    println!("{}:", index.title);
    for item in &index.items {
        println!("  {}", item.label);
    }

    println!("\nMerge regions:");
    for region in source.available_regions().await? {
        let mark = if region.selected { "x" } else { " " };
        println!("  [{}] {} ({})", mark, region.name, region.code);
    }

    source.playlist(&output).await?;
    println!("\nPlaylist written to {}", output);

    Ok(())
}
