//! Data models of the Stirr channel feed
//!
//! The feed is a single JSON document:
//!
//! ```json
//! {
//!   "headers": {"user-agent": "..."},
//!   "channels": {
//!     "<id>": {
//!       "name": "...", "chno": 101, "logo": "...", "description": "...",
//!       "groups": ["News"], "url": "https://.../master.m3u8",
//!       "headers": {}, "programs": [[1700000000, "Title"], ...]
//!     }
//!   }
//! }
//! ```
//!
//! `name`, `chno` and `url` are required; every other channel field is
//! optional and defaults to empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use tvsource::GroupFilter;

// ============================================================================
// Channel number
// ============================================================================

/// Channel number, numeric or free text
///
/// Numbers sort before text, numbers in numeric order, text lexically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelNumber {
    Number(i64),
    Text(String),
}

impl fmt::Display for ChannelNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ChannelNumber {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ChannelNumber {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl<'de> Deserialize<'de> for ChannelNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Int(n) => Self::Number(n),
            Repr::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Self::Number(f as i64)
            }
            Repr::Float(f) => Self::Text(f.to_string()),
            Repr::Text(s) => Self::Text(s),
        })
    }
}

// ============================================================================
// Programmes
// ============================================================================

/// One EPG entry, `[start, title, ...]` in the feed
///
/// `start` is a Unix timestamp in seconds (integer or float) or an RFC 3339
/// string. Elements after the title are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub start: DateTime<Utc>,
    pub title: String,
}

impl TryFrom<&Value> for Program {
    type Error = String;

    fn try_from(row: &Value) -> Result<Self, Self::Error> {
        let Some([start, title, ..]) = row.as_array().map(Vec::as_slice) else {
            return Err("expected [start, title]".to_string());
        };
        let title = title
            .as_str()
            .ok_or_else(|| format!("invalid programme title {}", title))?;

        Ok(Self {
            start: parse_start(start)?,
            title: title.to_string(),
        })
    }
}

fn parse_start(value: &Value) -> Result<DateTime<Utc>, String> {
    let start = match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(secs), _) => DateTime::from_timestamp(secs, 0),
            (None, Some(secs)) if secs.is_finite() => {
                let whole = secs.floor();
                let nanos = ((secs - whole) * 1e9) as u32;
                DateTime::from_timestamp(whole as i64, nanos)
            }
            _ => None,
        },
        Value::String(text) => {
            return DateTime::parse_from_rfc3339(text)
                .map(|start| start.with_timezone(&Utc))
                .map_err(|e| format!("invalid programme start {:?}: {}", text, e));
        }
        _ => None,
    };

    start.ok_or_else(|| format!("invalid programme start {}", value))
}

/// Parses EPG rows one by one, skipping the malformed ones
fn lenient_programs<'de, D>(deserializer: D) -> Result<Vec<Program>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = match Value::deserialize(deserializer)? {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => {
            warn!(programs = %other, "ignoring programmes that are not a list");
            Vec::new()
        }
    };

    Ok(rows
        .iter()
        .filter_map(|row| match Program::try_from(row) {
            Ok(program) => Some(program),
            Err(e) => {
                warn!(%row, "skipping programme: {}", e);
                None
            }
        })
        .collect())
}

impl Program {
    pub fn new(start: DateTime<Utc>, title: impl Into<String>) -> Self {
        Self {
            start,
            title: title.into(),
        }
    }
}

// ============================================================================
// Channels
// ============================================================================

/// A live channel of the feed
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Channel {
    /// Key of the channel in the feed mapping
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub chno: ChannelNumber,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    pub url: String,
    /// Headers required by this channel's stream
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Chronological EPG entries
    #[serde(default, deserialize_with = "lenient_programs")]
    pub programs: Vec<Program>,
}

impl Channel {
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    /// Whether a listing restricted by `filter` shows this channel
    pub fn matches(&self, filter: &GroupFilter) -> bool {
        match filter {
            GroupFilter::All => true,
            GroupFilter::Named(group) => self.in_group(group),
        }
    }
}

/// The whole feed document
///
/// Channels are shared behind `Arc` so regions reference them without
/// copying.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawFeed")]
pub struct ChannelFeed {
    pub channels: BTreeMap<String, Arc<Channel>>,
    /// Headers sent with every stream of the feed
    pub headers: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct RawFeed {
    #[serde(default)]
    channels: BTreeMap<String, Channel>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
}

impl From<RawFeed> for ChannelFeed {
    fn from(raw: RawFeed) -> Self {
        let channels = raw
            .channels
            .into_iter()
            .map(|(id, mut channel)| {
                channel.id = id.clone();
                (id, Arc::new(channel))
            })
            .collect();

        Self {
            channels,
            headers: raw.headers,
        }
    }
}

impl ChannelFeed {
    pub fn get(&self, id: &str) -> Option<&Arc<Channel>> {
        self.channels.get(id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
