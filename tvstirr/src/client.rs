//! HTTP client for the Stirr channel feed
//!
//! The feed is one gzip-compressed JSON document holding every channel, its
//! stream URL and a short EPG.

use crate::error::{Error, Result};
use crate::models::ChannelFeed;
use flate2::read::GzDecoder;
use reqwest::Client;
use std::io::Read;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Location of the compressed feed
pub const DEFAULT_FEED_URL: &str = "https://i.mjh.nz/Stirr/app.json.gz";

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Stirr feed client
#[derive(Debug, Clone)]
pub struct StirrClient {
    client: Client,
    feed_url: Url,
    timeout: Duration,
}

impl StirrClient {
    /// Create a client for the default feed
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_FEED_URL)
    }

    /// Create a client for another feed location
    pub fn with_url(feed_url: &str) -> Result<Self> {
        let timeout = Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS);
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, feed_url)
    }

    /// Create a client with a custom HTTP client
    pub fn with_client(client: Client, feed_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            feed_url: Url::parse(feed_url)?,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    pub fn feed_url(&self) -> &Url {
        &self.feed_url
    }

    /// Downloads, decompresses and parses the feed
    pub async fn fetch_feed(&self) -> Result<ChannelFeed> {
        debug!(url = %self.feed_url, "fetching channel feed");

        let response = self
            .client
            .get(self.feed_url.clone())
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Status {
                status: response.status().as_u16(),
                url: self.feed_url.to_string(),
            });
        }

        let body = response.bytes().await?;
        let feed = decode_feed(&body)?;
        debug!(channels = feed.len(), "channel feed loaded");
        Ok(feed)
    }
}

/// Parses a gzip-compressed feed document
pub fn decode_feed(compressed: &[u8]) -> Result<ChannelFeed> {
    let mut decoder = GzDecoder::new(compressed);
    let mut json = Vec::new();
    decoder.read_to_end(&mut json)?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    pub(crate) fn gzip(json: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    const FEED: &str = r#"{
        "headers": {"user-agent": "okhttp"},
        "channels": {
            "abc": {"name": "ABC News", "chno": 1, "url": "https://cdn/abc.m3u8", "groups": ["News"]}
        }
    }"#;

    #[test]
    fn test_decode_feed() {
        let feed = decode_feed(&gzip(FEED)).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.get("abc").unwrap().name, "ABC News");
    }

    #[test]
    fn test_decode_rejects_plain_json() {
        assert!(matches!(decode_feed(FEED.as_bytes()), Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_fetch_feed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/Stirr/app.json.gz")
            .with_header("content-type", "application/gzip")
            .with_body(gzip(FEED))
            .create_async()
            .await;

        let client = StirrClient::with_url(&format!("{}/Stirr/app.json.gz", server.url())).unwrap();
        let feed = client.fetch_feed().await.unwrap();

        assert_eq!(feed.headers.get("user-agent").map(String::as_str), Some("okhttp"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_feed_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/app.json.gz")
            .with_status(503)
            .create_async()
            .await;

        let client = StirrClient::with_url(&format!("{}/app.json.gz", server.url())).unwrap();
        let err = client.fetch_feed().await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 503, .. }));
    }

    #[tokio::test]
    #[ignore = "Integration test - calls real Stirr feed"]
    async fn test_real_feed() {
        let client = StirrClient::new().expect("Failed to create client");
        let feed = client.fetch_feed().await;

        assert!(feed.is_ok(), "Failed to fetch feed: {:?}", feed.err());
        println!("{} channels", feed.unwrap().len());
    }
}
