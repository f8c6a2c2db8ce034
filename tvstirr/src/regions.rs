//! Regions derived from the feed and the user's favourites
//!
//! A [`RegionSet`] is rebuilt on every access from the cached feed and the
//! current favourites list. It is never mutated: adding or removing a
//! favourite only changes the stored list, the next materialization picks
//! it up.

use crate::labels;
use crate::models::{Channel, ChannelFeed};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use tvsource::GroupFilter;

/// Code of a region
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegionCode {
    /// Every channel of the feed
    All,
    /// The user's favourites
    MyChannels,
    Custom(String),
}

impl RegionCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "ALL",
            Self::MyChannels => "MY_CHANNELS",
            Self::Custom(code) => code,
        }
    }
}

impl FromStr for RegionCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ALL" => Self::All,
            "MY_CHANNELS" => Self::MyChannels,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl From<&str> for RegionCode {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(code) => code,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, sorted grouping of channels
#[derive(Debug, Clone)]
pub struct Region {
    pub code: RegionCode,
    pub name: String,
    pub logo: Option<String>,
    /// Tie-break before the name when regions are listed
    pub sort: i32,
    pub channels: BTreeMap<String, Arc<Channel>>,
}

impl Region {
    fn new(code: RegionCode, name: &str, sort: i32) -> Self {
        Self {
            code,
            name: name.to_string(),
            logo: None,
            sort,
            channels: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// The regions available for one feed snapshot
#[derive(Debug, Clone)]
pub struct RegionSet {
    all: Region,
    my_channels: Region,
}

impl RegionSet {
    /// Builds `All` (every channel) and `MyChannels` (favourites present in
    /// the feed)
    pub fn materialize(feed: &ChannelFeed, favourites: &[String]) -> Self {
        let mut all = Region::new(RegionCode::All, labels::ALL, 1);
        let mut my_channels = Region::new(RegionCode::MyChannels, labels::MY_CHANNELS, 0);

        for (id, channel) in &feed.channels {
            all.channels.insert(id.clone(), Arc::clone(channel));
            if favourites.contains(id) {
                my_channels.channels.insert(id.clone(), Arc::clone(channel));
            }
        }

        Self { all, my_channels }
    }

    pub fn all(&self) -> &Region {
        &self.all
    }

    pub fn my_channels(&self) -> &Region {
        &self.my_channels
    }

    pub fn get(&self, code: &RegionCode) -> Option<&Region> {
        match code {
            RegionCode::All => Some(&self.all),
            RegionCode::MyChannels => Some(&self.my_channels),
            RegionCode::Custom(_) => None,
        }
    }

    /// The region for `code`, `All` for unknown codes
    pub fn get_or_all(&self, code: &RegionCode) -> &Region {
        self.get(code).unwrap_or(&self.all)
    }

    pub fn contains(&self, code: &RegionCode) -> bool {
        self.get(code).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        [&self.all, &self.my_channels].into_iter()
    }

    /// Regions ordered by `(sort, name)`
    pub fn sorted(&self) -> Vec<&Region> {
        let mut regions: Vec<&Region> = self.iter().collect();
        regions.sort_by(|a, b| (a.sort, &a.name).cmp(&(b.sort, &b.name)));
        regions
    }
}
