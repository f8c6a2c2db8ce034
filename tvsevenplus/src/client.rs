//! HTTP client for the 7plus API
//!
//! This module provides a client for the 7plus catalogue (navigation,
//! search, content pages, components, live players) and for playback
//! negotiation through the video service.
//!
//! The parameter sets sent to each endpoint (platform ids, versions, device
//! identifiers) are a compatibility contract with the upstream service and
//! are reproduced verbatim.
//!
//! # Example
//!
//! ```no_run
//! use tvsevenplus::SevenPlusClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SevenPlusClient::builder().token("...").build().await?;
//!
//!     let nav = client.nav().await?;
//!     println!("{} navigation items", nav.len());
//!
//!     let stream = client.play_live("7mate").await?;
//!     println!("Stream: {}", stream.url);
//!
//!     Ok(())
//! }
//! ```

use crate::brightcove::{BrightcoveNormalizer, MediaNormalizer};
use crate::error::{Error, Result};
use crate::models::{PlaybackError, VideoPlayer};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tvsource::{StreamDescriptor, TimedCache};
use url::Url;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "okhttp/4.9.1";

// Playback negotiation identifiers
const APP_ID: &str = "7plus";
const PLATFORM_TYPE: &str = "tv";
const DELIVERY_ID: &str = "csai";
const ADVERT_ID: &str = "null";
const DEVICE_ID: &str = "fm-k_zfMS1it5axvWRqkRt";
const PC: u32 = 3350;
const DEVICE_TYPE: &str = "androidtv";
const OZID: &str = "b09f7dc3-3999-47c7-a09f-8dce404c0455";
const SDK_VERIFICATION: &str = "true";

/// Base URLs of the services the client talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub market: String,
    pub component_cdn: String,
    pub component: String,
    pub search: String,
    pub video_service: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            market: "https://market-cdn.swm.digital".to_string(),
            component_cdn: "https://component-cdn.swm.digital".to_string(),
            component: "https://component.swm.digital".to_string(),
            search: "https://searchapi.swm.digital".to_string(),
            video_service: "https://videoservice.swm.digital".to_string(),
        }
    }
}

impl Endpoints {
    /// Every service behind one base URL (mock servers, proxies)
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            market: base.clone(),
            component_cdn: base.clone(),
            component: base.clone(),
            search: base.clone(),
            video_service: base,
        }
    }
}

/// 7plus HTTP client
///
/// The client owns a time-boxed cache for market resolution (see
/// [`SevenPlusClient::market_id`]); catalogue and playback calls always hit
/// the network.
#[derive(Clone)]
pub struct SevenPlusClient {
    pub(crate) client: Client,
    pub(crate) endpoints: Endpoints,
    pub(crate) timeout: Duration,
    pub(crate) token: String,
    pub(crate) location: Option<(f64, f64)>,
    pub(crate) markets: TimedCache<u32>,
    normalizer: Arc<dyn MediaNormalizer>,
}

impl fmt::Debug for SevenPlusClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SevenPlusClient")
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.timeout)
            .field("location", &self.location)
            .finish()
    }
}

impl SevenPlusClient {
    /// Create a new client with default settings
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Configured `(latitude, longitude)` used for market resolution
    pub fn location(&self) -> Option<(f64, f64)> {
        self.location
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    // ========================================================================
    // Request helpers
    // ========================================================================

    pub(crate) async fn send(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<Response> {
        let url = Url::parse(url)?;
        debug!(%url, "GET");
        let mut request = self.client.get(url).timeout(self.timeout).query(params);
        for (name, value) in headers {
            request = request.header(*name, value);
        }
        Ok(request.send().await?)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let response = self.send(url, params, &[]).await?;

        if !response.status().is_success() {
            return Err(Error::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json().await?)
    }

    // ========================================================================
    // Catalogue
    // ========================================================================

    /// Top-level navigation items
    pub async fn nav(&self) -> Result<Vec<Value>> {
        let params = [
            ("platform-id", "web".to_string()),
            ("market-id", self.market_id().await.to_string()),
            ("platform-version", "1.0.67393".to_string()),
            ("api-version", "4.3".to_string()),
        ];

        let url = format!("{}/content/nav", self.endpoints.component_cdn);
        let mut data: Value = self.get_json(&url, &params).await?;

        match data.get_mut("items").map(Value::take) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(Error::MissingField("items")),
        }
    }

    /// Free-text search
    pub async fn search(&self, query: &str) -> Result<Value> {
        let params = [
            ("searchTerm", query.to_string()),
            ("market-id", self.market_id().await.to_string()),
            ("api-version", "4.4".to_string()),
            ("platform-id", "androidtv".to_string()),
            ("platform-version", "4.25".to_string()),
        ];

        let url = format!("{}/3.0/api/Search", self.endpoints.search);
        self.get_json(&url, &params).await
    }

    /// Content page for `slug`
    pub async fn content(&self, slug: &str) -> Result<Value> {
        let params = [
            ("platform-id", "androidtv".to_string()),
            ("market-id", self.market_id().await.to_string()),
            ("platform-version", "4.25".to_string()),
            ("api-version", "4.4".to_string()),
        ];

        let url = format!("{}/content/{}", self.endpoints.component_cdn, slug);
        self.get_json(&url, &params).await
    }

    /// One component of the page `slug`
    pub async fn component(&self, slug: &str, component_id: &str) -> Result<Value> {
        let mut params = vec![("component-id", component_id.to_string())];
        params.extend(self.android_tv_params().await);

        let url = format!("{}/component/{}", self.endpoints.component, slug);
        self.get_json(&url, &params).await
    }

    /// Live player description for `slug`
    pub async fn video_player(&self, slug: &str) -> Result<VideoPlayer> {
        let params = self.android_tv_params().await;

        let url = format!("{}/player/live/{}", self.endpoints.component, slug);
        let mut data: Value = self.get_json(&url, &params).await?;

        let player = data
            .get_mut("videoPlayer")
            .map(Value::take)
            .ok_or(Error::MissingField("videoPlayer"))?;
        Ok(serde_json::from_value(player)?)
    }

    async fn android_tv_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("platform-id", "AndroidTv".to_string()),
            ("market-id", self.market_id().await.to_string()),
            ("platform-version", "4.25.0.0".to_string()),
            ("api-version", "4.4.0.0".to_string()),
            ("signedUp", "True".to_string()),
        ]
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Query parameters of a playback negotiation
    pub fn playback_params(
        account: &str,
        reference: &str,
        live: bool,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("appId", APP_ID.to_string()),
            ("platformType", PLATFORM_TYPE.to_string()),
            ("accountId", account.to_string()),
            ("referenceId", reference.to_string()),
            ("deliveryId", DELIVERY_ID.to_string()),
            ("advertid", ADVERT_ID.to_string()),
            ("deviceId", DEVICE_ID.to_string()),
            ("pc", PC.to_string()),
            ("deviceType", DEVICE_TYPE.to_string()),
            ("ozid", OZID.to_string()),
            ("sdkverification", SDK_VERIFICATION.to_string()),
        ];

        if live {
            params.push(("videoType", "live".to_string()));
        }

        params
    }

    /// Negotiates playback of `reference` in `account`
    ///
    /// Fails with [`Error::Api`] carrying the first upstream `error_code`
    /// when the response has no `media` field.
    pub async fn play(
        &self,
        account: &str,
        reference: &str,
        live: bool,
    ) -> Result<StreamDescriptor> {
        let params = Self::playback_params(account, reference, live);
        let headers = [
            ("X-USE-AUTHENTICATION", "UseTokenAuthentication".to_string()),
            ("Authorization", format!("Bearer {}", self.token)),
        ];

        let url = format!("{}/playback", self.endpoints.video_service);
        // Refusals come with an error status and a JSON body: always read it
        let data: Value = self.send(&url, &params, &headers).await?.json().await?;

        match data.get("media") {
            Some(media) => self.normalizer.normalize(media, live),
            None => Err(Error::api(Self::first_error_code(&data))),
        }
    }

    /// Resolves the live player of `slug` and negotiates its stream
    pub async fn play_live(&self, slug: &str) -> Result<StreamDescriptor> {
        let player = self.video_player(slug).await?;
        debug!(
            slug,
            account = %player.account_id,
            reference = %player.reference_id,
            "negotiating live stream"
        );
        self.play(&player.account_id, &player.reference_id, true).await
    }

    fn first_error_code(data: &Value) -> String {
        data.get(0)
            .cloned()
            .and_then(|entry| serde_json::from_value::<PlaybackError>(entry).ok())
            .map(|e| e.code())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Builder for configuring a SevenPlusClient
pub struct ClientBuilder {
    client: Option<Client>,
    endpoints: Endpoints,
    timeout: Duration,
    user_agent: String,
    token: String,
    location: Option<(f64, f64)>,
    normalizer: Arc<dyn MediaNormalizer>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("location", &self.location)
            .finish()
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            endpoints: Endpoints::default(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: String::new(),
            location: None,
            normalizer: Arc::new(BrightcoveNormalizer),
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Override the service base URLs
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Bearer credential sent with playback negotiations
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Resolve the market from coordinates instead of the caller's IP
    pub fn location(mut self, location: Option<(f64, f64)>) -> Self {
        self.location = location;
        self
    }

    /// Replace the media normalizer
    pub fn normalizer(mut self, normalizer: Arc<dyn MediaNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Build the client
    pub async fn build(self) -> Result<SevenPlusClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()?,
        };

        Ok(SevenPlusClient {
            client,
            endpoints: self.endpoints,
            timeout: self.timeout,
            token: self.token,
            location: self.location,
            markets: TimedCache::new(),
            normalizer: self.normalizer,
        })
    }
}
