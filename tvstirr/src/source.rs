//! The Stirr source
//!
//! [`StirrSource`] ties the feed client, the time-boxed feed cache and the
//! user state together and exposes the operations a host calls: browsing,
//! search, favourites, playback and playlist export.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tvconfig::MemoryUserState;
//! use tvstirr::{RegionCode, StirrClient, StirrSource};
//!
//! # async fn example() -> tvstirr::Result<()> {
//! let source = StirrSource::new(StirrClient::new()?, Arc::new(MemoryUserState::new()));
//!
//! let groups = source.live_tv(&RegionCode::All, None).await?;
//! for item in &groups.items {
//!     println!("{}", item.label);
//! }
//!
//! let stream = source.play("abc-news").await?;
//! println!("{}", stream.url);
//! # Ok(())
//! # }
//! ```

use crate::channels::{process_channels, ListOptions};
use crate::client::StirrClient;
use crate::config_ext::{StirrConfigExt, DEFAULT_FEED_CACHE_TTL_SECS};
use crate::error::{Error, Result};
use crate::favourites::Favourites;
use crate::labels;
use crate::models::{Channel, ChannelFeed};
use crate::playlist::{render_m3u, write_playlist, MergeSelection};
use crate::regions::{GroupFilter, RegionCode, RegionSet};
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tvconfig::{Config, UserData, UserState};
use tvsource::{
    Action, CacheKey, Folder, ListItem, StreamDescriptor, StreamProtocol, TimedCache, TvSource,
};

/// User-state namespace of the source
pub const USERDATA_NAMESPACE: &str = "stirr";

type StreamUrlFn = dyn Fn(&Channel) -> String + Send + Sync;

/// A region offered for playlist merging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionChoice {
    pub code: RegionCode,
    pub name: String,
    pub logo: Option<String>,
    /// Part of the stored merge selection
    pub selected: bool,
}

/// Stirr live TV source
#[derive(Clone)]
pub struct StirrSource {
    client: StirrClient,
    feed_cache: TimedCache<Arc<ChannelFeed>>,
    feed_ttl: Duration,
    favourites: Favourites,
    merge: MergeSelection,
    options: ListOptions,
    show_groups: bool,
    enabled: bool,
    stream_url: Arc<StreamUrlFn>,
}

impl fmt::Debug for StirrSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StirrSource")
            .field("client", &self.client)
            .field("feed_ttl", &self.feed_ttl)
            .field("options", &self.options)
            .field("show_groups", &self.show_groups)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl StirrSource {
    /// Creates a source with default display settings
    pub fn new(client: StirrClient, state: Arc<dyn UserState>) -> Self {
        Self {
            client,
            feed_cache: TimedCache::new(),
            feed_ttl: Duration::from_secs(DEFAULT_FEED_CACHE_TTL_SECS),
            favourites: Favourites::new(state.clone()),
            merge: MergeSelection::new(state),
            options: ListOptions::default(),
            show_groups: true,
            enabled: true,
            stream_url: Arc::new(|channel: &Channel| channel.url.clone()),
        }
    }

    /// Creates a source from the tvaddons configuration
    ///
    /// Display settings come from `sources.stirr`, favourites and merge
    /// selection are stored under `userdata.stirr`. A source disabled there
    /// refuses every feed-backed operation with [`Error::Disabled`].
    pub fn from_config(client: StirrClient, config: Arc<Config>) -> Result<Self> {
        let enabled = config.get_stirr_enabled()?;
        let options = config.get_stirr_list_options()?;
        let show_groups = config.get_stirr_show_groups()?;
        let feed_ttl = config.get_stirr_feed_cache_ttl()?;
        info!(enabled, ?options, show_groups, ?feed_ttl, "Stirr source configured");

        let state = Arc::new(UserData::new(config, USERDATA_NAMESPACE));
        Ok(Self::new(client, state)
            .with_options(options)
            .with_show_groups(show_groups)
            .with_feed_ttl(feed_ttl)
            .with_enabled(enabled))
    }

    pub fn with_options(mut self, options: ListOptions) -> Self {
        self.options = options;
        self
    }

    /// Without groups, region listings go straight to the channels
    pub fn with_show_groups(mut self, show_groups: bool) -> Self {
        self.show_groups = show_groups;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn with_feed_ttl(mut self, ttl: Duration) -> Self {
        self.feed_ttl = ttl;
        self
    }

    /// URL written for each channel of an exported playlist
    ///
    /// Defaults to the channel's own stream URL.
    pub fn with_stream_url<F>(mut self, stream_url: F) -> Self
    where
        F: Fn(&Channel) -> String + Send + Sync + 'static,
    {
        self.stream_url = Arc::new(stream_url);
        self
    }

    // ========================================================================
    // Data
    // ========================================================================

    /// The channel feed, fetched at most once per cache window
    pub async fn feed(&self) -> Result<Arc<ChannelFeed>> {
        if !self.enabled {
            return Err(Error::Disabled);
        }

        self.feed_cache
            .get_or_try_insert(CacheKey::new("feed"), self.feed_ttl, || async {
                Ok::<_, Error>(Arc::new(self.client.fetch_feed().await?))
            })
            .await
    }

    /// Regions of the current feed and favourites
    pub async fn regions(&self) -> Result<RegionSet> {
        let feed = self.feed().await?;
        let favourites = self.favourites.list()?;
        Ok(RegionSet::materialize(&feed, &favourites))
    }

    // ========================================================================
    // Browsing
    // ========================================================================

    /// Entry folder: Live TV, My Channels and Search
    pub fn home(&self) -> Folder {
        let region = |code: RegionCode| Action::Browse {
            region: code.as_str().to_string(),
            group: None,
        };

        let mut folder = Folder::new("Stirr");
        folder.add_item(ListItem::browse(labels::LIVE_TV, region(RegionCode::All)));
        folder.add_item(ListItem::browse(labels::MY_CHANNELS, region(RegionCode::MyChannels)));
        folder.add_item(ListItem::browse(labels::SEARCH, Action::Search));
        folder
    }

    /// Listing of a region
    ///
    /// Without `group` the region's group index is returned, with a group
    /// the matching channels. Unknown region codes show `All`.
    pub async fn live_tv(&self, code: &RegionCode, group: Option<GroupFilter>) -> Result<Folder> {
        self.live_tv_at(code, group, &Local::now()).await
    }

    /// [`live_tv`](Self::live_tv) with an explicit current time
    pub async fn live_tv_at<Tz>(
        &self,
        code: &RegionCode,
        group: Option<GroupFilter>,
        now: &DateTime<Tz>,
    ) -> Result<Folder>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let regions = self.regions().await?;
        let region = regions.get_or_all(code);
        let group = if self.show_groups {
            group
        } else {
            Some(GroupFilter::All)
        };

        let Some(group) = group else {
            return Ok(group_index(region.code.as_str(), &region.channels, region.logo.as_deref()));
        };

        let title = match &group {
            GroupFilter::All => region.name.clone(),
            GroupFilter::Named(name) => name.clone(),
        };
        let mut folder = Folder::new(title);
        folder.add_items(process_channels(
            &region.channels,
            &group,
            &region.code,
            self.options,
            now,
        ));
        Ok(folder)
    }

    /// Channels whose name, number or groups contain `query`
    pub async fn search(&self, query: &str) -> Result<Vec<ListItem>> {
        self.search_at(query, &Local::now()).await
    }

    /// [`search`](Self::search) with an explicit current time
    pub async fn search_at<Tz>(&self, query: &str, now: &DateTime<Tz>) -> Result<Vec<ListItem>>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let regions = self.regions().await?;
        let query = query.to_lowercase();

        let results: BTreeMap<String, Arc<Channel>> = regions
            .all()
            .channels
            .iter()
            .filter(|(_, channel)| search_text(channel).contains(&query))
            .map(|(id, channel)| (id.clone(), Arc::clone(channel)))
            .collect();
        debug!(query = %query, results = results.len(), "channel search");

        Ok(process_channels(
            &results,
            &GroupFilter::All,
            &RegionCode::All,
            self.options,
            now,
        ))
    }

    // ========================================================================
    // Favourites
    // ========================================================================

    /// Adds a channel to "My Channels"
    ///
    /// Returns the channel, or `None` when the id is unknown.
    pub async fn add_favourite(&self, id: &str) -> Result<Option<Arc<Channel>>> {
        let regions = self.regions().await?;
        self.favourites.add(id, &regions)
    }

    /// Removes a channel from "My Channels"
    pub async fn del_favourite(&self, id: &str) -> Result<bool> {
        self.favourites.remove(id)
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Stream of channel `id`
    ///
    /// Feed-level headers apply to every stream, channel headers override
    /// them.
    pub async fn play(&self, id: &str) -> Result<StreamDescriptor> {
        let feed = self.feed().await?;
        let channel = feed
            .get(id)
            .ok_or_else(|| Error::ChannelNotFound(id.to_string()))?;

        Ok(StreamDescriptor::new(channel.url.clone(), StreamProtocol::Hls)
            .live(true)
            .with_headers(feed.headers.clone())
            .with_headers(channel.headers.clone()))
    }

    // ========================================================================
    // Playlist export
    // ========================================================================

    /// The M3U document of the stored merge selection
    pub async fn render_playlist(&self) -> Result<String> {
        let regions = self.regions().await?;
        let selection = self.merge.resolve(&regions)?;
        Ok(render_m3u(&regions, &selection, |c| (self.stream_url)(c)))
    }

    /// Writes the M3U document of the stored merge selection to `path`
    pub async fn playlist(&self, path: impl AsRef<Path>) -> Result<()> {
        let regions = self.regions().await?;
        let selection = self.merge.resolve(&regions)?;
        info!(path = %path.as_ref().display(), regions = ?selection, "exporting playlist");
        write_playlist(path, &regions, &selection, |c| (self.stream_url)(c)).await
    }

    /// Regions that can be merged, ordered by `(sort, name)`
    pub async fn available_regions(&self) -> Result<Vec<RegionChoice>> {
        let regions = self.regions().await?;
        let stored = self.merge.codes()?;

        Ok(regions
            .sorted()
            .into_iter()
            .map(|region| RegionChoice {
                code: region.code.clone(),
                name: region.name.clone(),
                logo: region.logo.clone(),
                selected: stored.contains(&region.code),
            })
            .collect())
    }

    /// Stores the merge selection as given
    pub async fn set_merge_regions(&self, codes: &[RegionCode]) -> Result<()> {
        self.merge.set(codes)
    }
}

#[async_trait]
impl TvSource for StirrSource {
    fn name(&self) -> &str {
        "Stirr"
    }

    fn id(&self) -> &str {
        "stirr"
    }

    /// Resolves a channel id of the feed
    async fn resolve(&self, id: &str) -> tvsource::Result<StreamDescriptor> {
        Ok(self.play(id).await?)
    }
}

fn search_text(channel: &Channel) -> String {
    format!("{} {} {}", channel.name, channel.chno, channel.groups.join(" ")).to_lowercase()
}

/// "All (n)" followed by every group with its channel count
fn group_index(
    code: &str,
    channels: &BTreeMap<String, Arc<Channel>>,
    logo: Option<&str>,
) -> Folder {
    let mut groups: BTreeMap<&str, usize> = BTreeMap::new();
    for channel in channels.values() {
        for group in &channel.groups {
            *groups.entry(group.as_str()).or_default() += 1;
        }
    }

    let mut folder = Folder::new(labels::LIVE_TV);
    let browse = |group: GroupFilter| Action::Browse {
        region: code.to_string(),
        group: Some(group),
    };

    if !channels.is_empty() {
        folder.add_item(
            ListItem::browse(
                format!("{} ({})", labels::ALL, channels.len()),
                browse(GroupFilter::All),
            )
            .with_thumb(logo.map(str::to_string)),
        );
    }

    for (group, count) in groups {
        folder.add_item(
            ListItem::browse(format!("{} ({})", group, count), browse(GroupFilter::named(group)))
                .with_thumb(logo.map(str::to_string))
                .with_plot(format!("{}\n\n{}", group, labels::channel_count(count))),
        );
    }

    folder
}
