//! julialang.org nightly build bucket

use reqwest::StatusCode;
use reqwest::header::CONTENT_LENGTH;
use tracing::{debug, error};

use crate::config::{FETCH_TIMEOUT_MS, NIGHTLY_BASE_URL, ResolverConfig};
use crate::version::catalogue::Download;
use crate::version::error::FetchError;
use crate::version::nightly::{
    DEFAULT_NIGHTLY_PLATFORM, NIGHTLY_PLATFORMS, NightlyPlatform, NightlyProber,
};

/// Probes nightly artifacts with HEAD requests
pub struct HttpNightlyProber {
    client: reqwest::Client,
    base_url: String,
    platform: NightlyPlatform,
}

/// Outcome of a HEAD request against an artifact URL
enum Probe {
    Found { size: u64 },
    Missing,
}

impl HttpNightlyProber {
    /// Creates a prober for the default platform against a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: super::http_client(FETCH_TIMEOUT_MS),
            base_url: base_url.to_string(),
            platform: DEFAULT_NIGHTLY_PLATFORM,
        }
    }

    /// Unknown platform/arch pairs fall back to the default platform
    pub fn from_config(config: &ResolverConfig) -> Self {
        let platform = NightlyPlatform::find(&config.nightly_platform, &config.nightly_arch)
            .unwrap_or_else(|| {
                debug!(
                    "No nightly builds for {}/{}, probing {}/{}",
                    config.nightly_platform,
                    config.nightly_arch,
                    DEFAULT_NIGHTLY_PLATFORM.platform,
                    DEFAULT_NIGHTLY_PLATFORM.arch
                );
                DEFAULT_NIGHTLY_PLATFORM
            });

        Self {
            client: super::http_client(config.timeout_ms),
            base_url: config.nightly_base_url.clone(),
            platform,
        }
    }

    /// Nightly downloads that currently exist across all known platforms
    pub async fn downloads(&self, major_minor: Option<&str>) -> Result<Vec<Download>, FetchError> {
        let mut downloads = Vec::new();

        for platform in NIGHTLY_PLATFORMS {
            let url = platform.url(&self.base_url, major_minor);
            if let Probe::Found { size } = self.head(&url).await? {
                downloads.push(Download {
                    url,
                    triplet: None,
                    kind: platform.kind().to_string(),
                    arch: platform.arch.to_string(),
                    asc: None,
                    sha256: None,
                    size,
                    version: major_minor.unwrap_or("nightly").to_string(),
                    os: platform.platform.to_string(),
                    extension: platform.ext.to_string(),
                });
            }
        }

        Ok(downloads)
    }

    async fn head(&self, url: &str) -> Result<Probe, FetchError> {
        let response = self.client.head(url).send().await?;
        let status = response.status();

        if status.is_success() {
            let size = response
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            return Ok(Probe::Found { size });
        }

        if status != StatusCode::NOT_FOUND {
            error!("HTTP HEAD request to {} failed with response: {}", url, status);
            let body = response.text().await.unwrap_or_default();
            error!("{}", body);
        }

        Ok(Probe::Missing)
    }
}

impl Default for HttpNightlyProber {
    fn default() -> Self {
        Self::new(NIGHTLY_BASE_URL)
    }
}

#[async_trait::async_trait]
impl NightlyProber for HttpNightlyProber {
    async fn probe(&self, major_minor: &str) -> Result<bool, FetchError> {
        let url = self.platform.url(&self.base_url, Some(major_minor));
        Ok(matches!(self.head(&url).await?, Probe::Found { .. }))
    }
}
