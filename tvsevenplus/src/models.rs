//! Data models for 7plus API responses
//!
//! Catalogue endpoints (nav, search, content, component) are passed through
//! as `serde_json::Value`: their layout is interpreted by the host. Only the
//! responses the client itself acts upon are typed here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Market resolution
// ============================================================================

/// Response of the market-cdn `ip` and `location` endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketResponse {
    #[serde(rename = "_id")]
    pub id: u32,
}

// ============================================================================
// Live player
// ============================================================================

/// `videoPlayer` object of the `player/live/<slug>` endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPlayer {
    /// Brightcove account the stream belongs to
    #[serde(alias = "videoAccountId")]
    pub account_id: String,
    /// Content reference to negotiate
    #[serde(alias = "videoId", alias = "mediaId")]
    pub reference_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

// ============================================================================
// Playback negotiation
// ============================================================================

/// One entry of a refused playback response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackError {
    pub error_code: Value,
    #[serde(default)]
    pub message: Option<String>,
}

impl PlaybackError {
    /// Error code as text, whether upstream sent a string or a number
    pub fn code(&self) -> String {
        match &self.error_code {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Brightcove media descriptor (`media` field of a playback response)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BrightcoveMedia {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sources: Vec<BrightcoveSource>,
}

/// One rendition of a Brightcove media
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BrightcoveSource {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub key_systems: HashMap<String, KeySystem>,
}

impl BrightcoveSource {
    pub fn is_protected(&self) -> bool {
        !self.key_systems.is_empty()
    }

    /// License server for Widevine, if the source is protected with it
    pub fn widevine_license(&self) -> Option<&str> {
        self.key_systems
            .get("com.widevine.alpha")
            .and_then(|k| k.license_url.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KeySystem {
    #[serde(default)]
    pub license_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_response() {
        let market: MarketResponse =
            serde_json::from_str(r#"{"_id": 12, "name": "Perth"}"#).unwrap();
        assert_eq!(market.id, 12);
    }

    #[test]
    fn test_video_player_aliases() {
        let player: VideoPlayer = serde_json::from_str(
            r#"{"videoAccountId": "5303576322001", "videoId": "ref:7mate", "title": "7mate"}"#,
        )
        .unwrap();
        assert_eq!(player.account_id, "5303576322001");
        assert_eq!(player.reference_id, "ref:7mate");

        let player: VideoPlayer =
            serde_json::from_str(r#"{"accountId": "1", "referenceId": "ref:7"}"#).unwrap();
        assert_eq!(player.reference_id, "ref:7");
        assert!(player.title.is_none());
    }

    #[test]
    fn test_playback_error_code_as_text() {
        let errors: Vec<PlaybackError> =
            serde_json::from_str(r#"[{"error_code": 403}, {"error_code": "X"}]"#).unwrap();
        assert_eq!(errors[0].code(), "403");
        assert_eq!(errors[1].code(), "X");
    }
}
