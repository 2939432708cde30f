use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::GalleryConfig;

use super::GalleryError;

/// Fetches a user's gallery listing from the configured upstream.
pub struct GalleryClient {
    client: Client,
    config: GalleryConfig,
}

impl GalleryClient {
    pub fn new(config: GalleryConfig) -> Result<Self, GalleryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| GalleryError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Upstream URL for a username.
    pub fn listing_url(&self, username: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(username)
        )
    }

    /// Fetch the listing and return the upstream JSON untouched.
    ///
    /// The upstream status code is not inspected: whatever JSON it returns is
    /// passed through. Only transport failures and non-JSON bodies are errors.
    pub async fn fetch(&self, username: &str) -> Result<Value, GalleryError> {
        let url = self.listing_url(username);
        debug!(url = %url, "Fetching gallery listing");

        let response = self.client.get(&url).send().await?;
        let body = response.json::<Value>().await?;

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> GalleryClient {
        GalleryClient::new(GalleryConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_listing_url() {
        assert_eq!(
            client("http://gallery.local/u/").listing_url("alice"),
            "http://gallery.local/u/alice"
        );
    }

    #[test]
    fn test_listing_url_encodes_username() {
        assert_eq!(
            client("http://gallery.local").listing_url("a b/c"),
            "http://gallery.local/a%20b%2Fc"
        );
    }

    #[tokio::test]
    async fn test_fetch_unreachable_upstream() {
        let err = client("http://127.0.0.1:9").fetch("alice").await.unwrap_err();
        assert!(matches!(
            err,
            GalleryError::ConnectionFailed(_) | GalleryError::Request(_) | GalleryError::Timeout
        ));
    }
}
