//! # tvsource
//!
//! Common traits and types for tvaddons sources.
//!
//! This crate provides the abstractions shared by the TV sources of the
//! workspace (broadcaster API, channel-list feed):
//!
//! - **[`TvSource`]**: identification and playback resolution.
//! - **[`TimedCache`]**: time-boxed memoization keyed by operation and arguments.
//! - **[`Folder`] / [`ListItem`]**: a uniform navigation model that hosts render.
//! - **[`StreamDescriptor`]**: the terminal playable stream (URL + headers).

pub mod cache;
pub mod menu;
pub mod stream;

use std::fmt::Debug;

pub use cache::{CacheKey, TimedCache};
pub use menu::{Action, ContextAction, Folder, GroupFilter, ListItem};
pub use stream::{StreamDescriptor, StreamProtocol};

/// Error types for source operations
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Upstream refused the request with its own error code
    #[error("API error: {code}")]
    Api { code: String },

    #[error("Source not available: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Other(String),
}

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Main trait for TV sources
///
/// A source knows how to turn one of its own identifiers (a channel id, a
/// live slug) into a playable [`StreamDescriptor`]. How the identifier is
/// resolved is up to the source: a pure lookup in already-fetched data, or a
/// negotiation with the upstream service.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use in async hosts.
#[async_trait::async_trait]
pub trait TvSource: Debug + Send + Sync {
    /// Human-readable name of the source
    fn name(&self) -> &str;

    /// Unique identifier, suitable for URLs and configuration namespaces
    fn id(&self) -> &str;

    /// Resolves `id` to a playable stream
    async fn resolve(&self, id: &str) -> Result<StreamDescriptor>;
}
