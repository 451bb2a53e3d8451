use serde::Deserialize;
use std::path::Path;

// =============================================================================
// Remote locations
// =============================================================================

/// Catalogue of every published Julia release, keyed by version
pub const VERSIONS_JSON_URL: &str = "https://julialang-s3.julialang.org/bin/versions.json";

/// Root of the nightly build bucket
pub const NIGHTLY_BASE_URL: &str = "https://julialangnightlies-s3.julialang.org/bin";

// =============================================================================
// Release lines
// =============================================================================

/// Long-term support release line resolved by the `lts` alias
pub const LTS_VERSION: &str = "1.10";

// =============================================================================
// Fetch-related constants
// =============================================================================

/// Retries after the first failed catalogue download
pub const FETCH_MAX_RETRIES: u32 = 5;

/// Base delay for exponential backoff between catalogue retries (500ms)
pub const FETCH_RETRY_DELAY_MS: u64 = 500;

/// Upper bound for a single backoff sleep (30 seconds)
pub const FETCH_MAX_BACKOFF_MS: u64 = 30_000;

/// Timeout for a single HTTP request in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Resolver configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    pub versions_url: String,
    pub nightly_base_url: String,
    pub lts_version: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
    /// Platform probed for `MAJOR.MINOR-nightly` specifiers
    pub nightly_platform: String,
    pub nightly_arch: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            versions_url: VERSIONS_JSON_URL.to_string(),
            nightly_base_url: NIGHTLY_BASE_URL.to_string(),
            lts_version: LTS_VERSION.to_string(),
            max_retries: FETCH_MAX_RETRIES,
            retry_delay_ms: FETCH_RETRY_DELAY_MS,
            timeout_ms: FETCH_TIMEOUT_MS,
            nightly_platform: "linux".to_string(),
            nightly_arch: "x86_64".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn resolver_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<ResolverConfig>(json!({
            "maxRetries": 1,
            "retryDelayMs": 0
        }))
        .unwrap();

        assert_eq!(result.max_retries, 1);
        assert_eq!(result.retry_delay_ms, 0);
        assert_eq!(result.versions_url, VERSIONS_JSON_URL);
        assert_eq!(result.lts_version, LTS_VERSION);
    }

    #[test]
    fn resolver_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<ResolverConfig>(json!({
            "versionsUrl": "http://localhost/versions.json",
            "nightlyBaseUrl": "http://localhost/bin",
            "ltsVersion": "1.6",
            "maxRetries": 2,
            "retryDelayMs": 10,
            "timeoutMs": 1000,
            "nightlyPlatform": "macos",
            "nightlyArch": "aarch64"
        }))
        .unwrap();

        assert_eq!(
            result,
            ResolverConfig {
                versions_url: "http://localhost/versions.json".to_string(),
                nightly_base_url: "http://localhost/bin".to_string(),
                lts_version: "1.6".to_string(),
                max_retries: 2,
                retry_delay_ms: 10,
                timeout_ms: 1000,
                nightly_platform: "macos".to_string(),
                nightly_arch: "aarch64".to_string(),
            }
        );
    }

    #[test]
    fn from_file_reads_json_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{ "ltsVersion": "1.6" }"#).unwrap();

        let result = ResolverConfig::from_file(&path).unwrap();

        assert_eq!(result.lts_version, "1.6");
        assert_eq!(result.max_retries, FETCH_MAX_RETRIES);
    }

    #[test]
    fn from_file_fails_for_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(ResolverConfig::from_file(&temp_dir.path().join("missing.json")).is_err());
    }
}
