//! Media descriptor normalization
//!
//! A successful playback negotiation returns a Brightcove `media` object
//! listing several renditions. [`MediaNormalizer`] turns it into the single
//! [`StreamDescriptor`] handed to the player; [`BrightcoveNormalizer`] is the
//! default implementation.

use crate::error::{Error, Result};
use crate::models::{BrightcoveMedia, BrightcoveSource};
use serde_json::Value;
use tvsource::{StreamDescriptor, StreamProtocol};

/// Turns an upstream media descriptor into a playable stream
pub trait MediaNormalizer: Send + Sync {
    fn normalize(&self, media: &Value, live: bool) -> Result<StreamDescriptor>;
}

/// Picks the best rendition of a Brightcove media
///
/// Preference order: clear HLS, then DASH (with its Widevine license when
/// protected), then progressive files. HTTPS renditions win over plain HTTP
/// ones of the same kind.
#[derive(Debug, Clone, Default)]
pub struct BrightcoveNormalizer;

impl BrightcoveNormalizer {
    fn rank(source: &BrightcoveSource) -> Option<(u8, u8, StreamProtocol)> {
        let src = source.src.as_deref().filter(|s| !s.is_empty())?;
        let protocol = source
            .mime_type
            .as_deref()
            .and_then(StreamProtocol::from_mime)
            .or_else(|| match source.container.as_deref() {
                Some("MP4") => Some(StreamProtocol::Progressive),
                _ => None,
            })?;

        let kind = match protocol {
            StreamProtocol::Hls if !source.is_protected() => 0,
            StreamProtocol::Dash => 1,
            StreamProtocol::Progressive if !source.is_protected() => 2,
            _ => return None,
        };
        let scheme = if src.starts_with("https://") { 0 } else { 1 };

        Some((kind, scheme, protocol))
    }
}

impl MediaNormalizer for BrightcoveNormalizer {
    fn normalize(&self, media: &Value, live: bool) -> Result<StreamDescriptor> {
        let media: BrightcoveMedia = serde_json::from_value(media.clone())?;

        let (source, protocol) = media
            .sources
            .iter()
            .filter_map(|s| Self::rank(s).map(|rank| (rank, s)))
            .min_by_key(|(rank, _)| (rank.0, rank.1))
            .map(|(rank, s)| (s, rank.2))
            .ok_or(Error::NoPlayableSource)?;

        let url = source.src.clone().ok_or(Error::NoPlayableSource)?;
        let license = if protocol == StreamProtocol::Dash {
            source.widevine_license().map(str::to_string)
        } else {
            None
        };

        Ok(StreamDescriptor::new(url, protocol)
            .live(live)
            .with_license(license))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefers_clear_hls() {
        let media = json!({
            "sources": [
                {"src": "https://cdn/manifest.mpd", "type": "application/dash+xml"},
                {"src": "http://cdn/master.m3u8", "type": "application/x-mpegURL"},
                {"src": "https://cdn/master.m3u8", "type": "application/x-mpegURL"},
            ]
        });

        let stream = BrightcoveNormalizer.normalize(&media, true).unwrap();
        assert_eq!(stream.url, "https://cdn/master.m3u8");
        assert_eq!(stream.protocol, StreamProtocol::Hls);
        assert!(stream.live);
        assert!(stream.license_url.is_none());
    }

    #[test]
    fn test_protected_dash_carries_license() {
        let media = json!({
            "sources": [
                {
                    "src": "https://cdn/master.m3u8",
                    "type": "application/x-mpegURL",
                    "key_systems": {"com.apple.fps.1_0": {"license_url": "https://fps"}}
                },
                {
                    "src": "https://cdn/manifest.mpd",
                    "type": "application/dash+xml",
                    "key_systems": {"com.widevine.alpha": {"license_url": "https://wv/license"}}
                }
            ]
        });

        let stream = BrightcoveNormalizer.normalize(&media, false).unwrap();
        assert_eq!(stream.protocol, StreamProtocol::Dash);
        assert_eq!(stream.license_url.as_deref(), Some("https://wv/license"));
        assert!(!stream.live);
    }

    #[test]
    fn test_mp4_container_fallback() {
        let media = json!({"sources": [{"src": "https://cdn/video.mp4", "container": "MP4"}]});
        let stream = BrightcoveNormalizer.normalize(&media, false).unwrap();
        assert_eq!(stream.protocol, StreamProtocol::Progressive);
    }

    #[test]
    fn test_no_usable_source() {
        let media = json!({"sources": [{"type": "application/x-mpegURL"}]});
        assert!(matches!(
            BrightcoveNormalizer.normalize(&media, true),
            Err(Error::NoPlayableSource)
        ));
    }
}
