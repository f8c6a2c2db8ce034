//! Playable stream description

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Delivery protocol of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamProtocol {
    Hls,
    Dash,
    /// Plain file over HTTP (MP4, AAC, ...)
    Progressive,
}

impl StreamProtocol {
    /// Guesses the protocol from a MIME type
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_ascii_lowercase().as_str() {
            "application/x-mpegurl" | "application/vnd.apple.mpegurl" => Some(Self::Hls),
            "application/dash+xml" => Some(Self::Dash),
            "video/mp4" | "audio/mp4" | "audio/aac" | "audio/mpeg" => Some(Self::Progressive),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Hls => "application/vnd.apple.mpegurl",
            Self::Dash => "application/dash+xml",
            Self::Progressive => "video/mp4",
        }
    }
}

/// Everything a player needs to open a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub url: String,
    pub protocol: StreamProtocol,
    /// HTTP headers to send with every manifest/segment request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub live: bool,
    /// License server for protected streams (decryption is up to the player)
    pub license_url: Option<String>,
}

impl StreamDescriptor {
    pub fn new(url: impl Into<String>, protocol: StreamProtocol) -> Self {
        Self {
            url: url.into(),
            protocol,
            headers: BTreeMap::new(),
            live: false,
            license_url: None,
        }
    }

    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_license(mut self, license_url: Option<String>) -> Self {
        self.license_url = license_url;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_from_mime() {
        assert_eq!(
            StreamProtocol::from_mime("application/x-mpegURL"),
            Some(StreamProtocol::Hls)
        );
        assert_eq!(
            StreamProtocol::from_mime("application/dash+xml"),
            Some(StreamProtocol::Dash)
        );
        assert_eq!(
            StreamProtocol::from_mime("video/mp4"),
            Some(StreamProtocol::Progressive)
        );
        assert_eq!(StreamProtocol::from_mime("text/html"), None);
    }

    #[test]
    fn test_later_headers_override_earlier_ones() {
        let stream = StreamDescriptor::new("https://example.com/live.m3u8", StreamProtocol::Hls)
            .with_headers([("user-agent", "a"), ("referer", "r")])
            .with_headers([("user-agent", "b")]);

        assert_eq!(stream.headers.get("user-agent").map(String::as_str), Some("b"));
        assert_eq!(stream.headers.len(), 2);
    }
}
