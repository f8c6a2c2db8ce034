//! Market resolution
//!
//! Every catalogue request is scoped to a market id. The market is resolved
//! from the configured coordinates when present, otherwise from the caller's
//! IP. Resolution never fails: any error falls back to Sydney.

use crate::client::SevenPlusClient;
use crate::error::Result;
use crate::models::MarketResponse;
use std::convert::Infallible;
use std::time::Duration;
use tracing::debug;
use tvsource::CacheKey;

/// Market used when resolution fails
pub const SYDNEY_MARKET_ID: u32 = 4;

/// Lifetime of an IP-based resolution
pub const MARKET_IP_TTL: Duration = Duration::from_secs(10 * 60);

/// Lifetime of a coordinate-based resolution
pub const MARKET_LOCATION_TTL: Duration = Duration::from_secs(30 * 60);

impl SevenPlusClient {
    /// Market id for catalogue requests
    pub async fn market_id(&self) -> u32 {
        match self.location {
            Some((lat, lon)) => self.market_by_location(lat, lon).await,
            None => self.market_by_ip().await,
        }
    }

    /// Market of the caller's IP, cached for 10 minutes
    pub async fn market_by_ip(&self) -> u32 {
        let url = format!("{}/v1/market/ip/", self.endpoints.market);
        let params = [("apikey", "web".to_string())];

        self.cached_market(CacheKey::new("market_ip"), MARKET_IP_TTL, &url, &params)
            .await
    }

    /// Market of a coordinate pair, cached for 30 minutes per pair
    pub async fn market_by_location(&self, lat: f64, lon: f64) -> u32 {
        let lat = format!("{:.4}", lat);
        let lon = format!("{:.4}", lon);
        let url = format!("{}/v1/market/location/", self.endpoints.market);
        let params = [
            ("apikey", "web".to_string()),
            ("lat", lat.clone()),
            ("lon", lon.clone()),
        ];

        let key = CacheKey::new("market_location").arg(lat).arg(lon);
        self.cached_market(key, MARKET_LOCATION_TTL, &url, &params)
            .await
    }

    async fn cached_market(
        &self,
        key: CacheKey,
        ttl: Duration,
        url: &str,
        params: &[(&str, String)],
    ) -> u32 {
        let resolved = self
            .markets
            .get_or_try_insert(key, ttl, || async {
                Ok::<_, Infallible>(match self.fetch_market(url, params).await {
                    Ok(id) => id,
                    Err(e) => {
                        debug!("Failed to get market id ({}), using Sydney", e);
                        SYDNEY_MARKET_ID
                    }
                })
            })
            .await;

        match resolved {
            Ok(id) => id,
            Err(never) => match never {},
        }
    }

    async fn fetch_market(&self, url: &str, params: &[(&str, String)]) -> Result<u32> {
        let market: MarketResponse = self.get_json(url, params).await?;
        Ok(market.id)
    }
}
