//! 7plus client library for tvaddons
//!
//! This crate provides a Rust client for the 7plus broadcaster API: market
//! resolution, catalogue endpoints and negotiated playback of live channels
//! and on-demand content.
//!
//! # Features
//!
//! - **Market Resolution**: Market id from the caller's IP or a configured
//!   location, cached and falling back to Sydney
//! - **Catalogue**: Navigation, search, content pages, components and live
//!   players, passed through as JSON
//! - **Playback**: Authenticated negotiation with the video service, the
//!   returned media normalized by a [`MediaNormalizer`]
//! - **Configuration Extension**: Token and location stored in tvconfig
//!
//! # Example
//!
//! ```no_run
//! use tvsevenplus::SevenPlusClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SevenPlusClient::builder()
//!         .token("...")
//!         .location(Some((-31.9505, 115.8605)))
//!         .build()
//!         .await?;
//!
//!     println!("Market: {}", client.market_id().await);
//!
//!     let stream = client.play_live("7mate").await?;
//!     println!("Stream: {} ({:?})", stream.url, stream.protocol);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! A refused negotiation surfaces as [`Error::Api`] carrying the upstream
//! `error_code`. Market resolution never fails.

pub mod brightcove;
pub mod client;
pub mod error;
pub mod market;
pub mod models;
pub mod source;

#[cfg(feature = "tvconfig")]
pub mod config_ext;

// Re-exports
pub use brightcove::{BrightcoveNormalizer, MediaNormalizer};
pub use client::{ClientBuilder, Endpoints, SevenPlusClient};
pub use error::{Error, Result};
pub use market::{MARKET_IP_TTL, MARKET_LOCATION_TTL, SYDNEY_MARKET_ID};
pub use models::{BrightcoveMedia, BrightcoveSource, MarketResponse, PlaybackError, VideoPlayer};

#[cfg(feature = "tvconfig")]
pub use config_ext::SevenPlusConfigExt;
