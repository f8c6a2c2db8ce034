//! `TvSource` implementation for 7plus live channels

use crate::client::SevenPlusClient;
use async_trait::async_trait;
use tvsource::{Result, StreamDescriptor, TvSource};

#[async_trait]
impl TvSource for SevenPlusClient {
    fn name(&self) -> &str {
        "7plus"
    }

    fn id(&self) -> &str {
        "sevenplus"
    }

    /// Resolves a live channel slug (`7mate`, `7two`, ...)
    async fn resolve(&self, id: &str) -> Result<StreamDescriptor> {
        Ok(self.play_live(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Endpoints;
    use mockito::Matcher;
    use tvsource::SourceError;

    #[tokio::test]
    async fn test_resolve_maps_api_refusal() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/market/ip/")
            .match_query(Matcher::Any)
            .with_body(r#"{"_id": 4}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/player/live/7two")
            .match_query(Matcher::Any)
            .with_body(r#"{"videoPlayer": {"accountId": "acc", "referenceId": "ref:7two"}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/playback")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"[{"error_code": "Unauthorized"}]"#)
            .create_async()
            .await;

        let client = SevenPlusClient::builder()
            .endpoints(Endpoints::single(server.url()))
            .build()
            .await
            .unwrap();
        let source: &dyn TvSource = &client;

        assert_eq!(source.id(), "sevenplus");
        match source.resolve("7two").await {
            Err(SourceError::Api { code }) => assert_eq!(code, "Unauthorized"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
