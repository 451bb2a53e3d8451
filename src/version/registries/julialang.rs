//! julialang.org release catalogue

use std::time::Duration;

use tracing::{info, warn};

use crate::config::{FETCH_MAX_BACKOFF_MS, ResolverConfig};
use crate::version::catalogue::{Catalogue, VersionsJson};
use crate::version::error::FetchError;

/// Catalogue implementation downloading `versions.json` over HTTP
pub struct JuliaLangCatalogue {
    client: reqwest::Client,
    versions_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl JuliaLangCatalogue {
    /// Creates a catalogue reading from a custom `versions.json` URL
    pub fn new(versions_url: &str) -> Self {
        Self::from_config(&ResolverConfig {
            versions_url: versions_url.to_string(),
            ..ResolverConfig::default()
        })
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            client: super::http_client(config.timeout_ms),
            versions_url: config.versions_url.clone(),
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Delay before retry number `retry` (1-based), doubling each time
    fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.retry_delay
            .saturating_mul(factor)
            .min(Duration::from_millis(FETCH_MAX_BACKOFF_MS))
    }

    async fn download_once(&self) -> Result<String, FetchError> {
        let response = self.client.get(&self.versions_url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!("versions.json returned status {}: {}", status, self.versions_url);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.versions_url.clone(),
            });
        }

        Ok(response.text().await?)
    }
}

impl Default for JuliaLangCatalogue {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}

#[async_trait::async_trait]
impl Catalogue for JuliaLangCatalogue {
    async fn fetch_versions_json(&self) -> Result<VersionsJson, FetchError> {
        let mut retries = 0;

        // Occasionally the connection is reset, so the download is retried
        let body = loop {
            match self.download_once().await {
                Ok(body) => break body,
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    let backoff = self.backoff(retries);
                    info!(
                        "Download of versions.json failed, trying again (retry {}/{} in {}ms). Error: {}",
                        retries,
                        self.max_retries,
                        backoff.as_millis(),
                        e
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) if e.is_retryable() => {
                    return Err(FetchError::Unavailable {
                        attempts: retries + 1,
                        source: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        };

        serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse versions.json: {}", e);
            FetchError::InvalidResponse(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use rstest::rstest;

    fn catalogue(server: &Server, max_retries: u32) -> JuliaLangCatalogue {
        JuliaLangCatalogue::from_config(&ResolverConfig {
            versions_url: format!("{}/bin/versions.json", server.url()),
            max_retries,
            retry_delay_ms: 0,
            ..ResolverConfig::default()
        })
    }

    #[tokio::test]
    async fn fetch_versions_json_returns_entries_in_document_order() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/bin/versions.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "1.10.4": { "files": [], "stable": true },
                    "1.6.7": { "files": [], "stable": true },
                    "1.11.0-rc1": { "files": [], "stable": false }
                }"#,
            )
            .create_async()
            .await;

        let result = catalogue(&server, 0).fetch_versions_json().await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            result.keys().collect::<Vec<_>>(),
            vec!["1.10.4", "1.6.7", "1.11.0-rc1"]
        );
        assert!(!result["1.11.0-rc1"].stable);
    }

    #[tokio::test]
    async fn fetch_versions_json_gives_up_after_max_retries() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/bin/versions.json")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let result = catalogue(&server, 2).fetch_versions_json().await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(matches!(err, FetchError::Unavailable { attempts: 3, .. }));
        assert!(
            err.to_string()
                .starts_with("Unable to download versions.json after 3 attempts")
        );
    }

    #[tokio::test]
    async fn fetch_versions_json_does_not_retry_invalid_json() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/bin/versions.json")
            .with_status(200)
            .with_body("<html>not json</html>")
            .expect(1)
            .create_async()
            .await;

        let result = catalogue(&server, 5).fetch_versions_json().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FetchError::InvalidResponse(_))));
    }

    #[rstest]
    #[case(1, 500)]
    #[case(2, 1000)]
    #[case(3, 2000)]
    #[case(10, 30_000)]
    #[case(40, 30_000)]
    fn backoff_doubles_up_to_cap(#[case] retry: u32, #[case] expected_ms: u64) {
        let catalogue = JuliaLangCatalogue::default();
        assert_eq!(catalogue.backoff(retry), Duration::from_millis(expected_ms));
    }
}
