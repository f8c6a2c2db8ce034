//! Stirr channel-list source for tvaddons
//!
//! This crate turns the Stirr channel feed (one gzip-compressed JSON
//! document) into browsable regions, EPG-annotated channel listings and an
//! M3U playlist.
//!
//! # Features
//!
//! - **Feed**: downloaded and decompressed by [`StirrClient`], cached for
//!   15 minutes by [`StirrSource`]
//! - **Regions**: "All" and "My Channels", rebuilt from the feed and the
//!   user's favourites on every access
//! - **Listings**: sorted by channel number or name, filtered by group,
//!   with the upcoming programmes in each plot
//! - **Search**: substring match on name, number and groups
//! - **Playlist**: `#EXTM3U` export of the selected regions, deduplicated
//! - **Playback**: direct lookup, stream URL plus the headers it needs
//!
//! # Example
//!
//! ```no_run
//! use tvconfig::get_config;
//! use tvstirr::{RegionCode, StirrClient, StirrSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = StirrSource::from_config(StirrClient::new()?, get_config())?;
//!
//!     source.add_favourite("abc-news").await?;
//!     let mine = source.live_tv(&RegionCode::MyChannels, None).await?;
//!     println!("{} entries in My Channels", mine.len());
//!
//!     source.playlist("/tmp/stirr.m3u8").await?;
//!     Ok(())
//! }
//! ```

pub mod channels;
pub mod client;
pub mod config_ext;
pub mod error;
pub mod favourites;
pub mod labels;
pub mod models;
pub mod playlist;
pub mod regions;
pub mod source;

// Re-exports
pub use channels::{epg_lines, process_channels, ListOptions, EPG_COUNT};
pub use client::{decode_feed, StirrClient, DEFAULT_FEED_URL};
pub use config_ext::StirrConfigExt;
pub use error::{Error, Result};
pub use favourites::Favourites;
pub use models::{Channel, ChannelFeed, ChannelNumber, Program};
pub use playlist::{render_m3u, write_playlist, MergeSelection, M3U_HEADER};
pub use regions::{GroupFilter, Region, RegionCode, RegionSet};
pub use source::{RegionChoice, StirrSource};
