//! Julia release catalogue (`versions.json`)

#[cfg(test)]
use mockall::automock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::version::error::FetchError;

/// Contents of `versions.json`, keyed by version string in document order
pub type VersionsJson = IndexMap<String, VersionInfo>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub files: Vec<Download>,
    pub stable: bool,
}

/// A downloadable artifact of a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Download {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triplet: Option<String>,
    pub kind: String,
    pub arch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    pub size: u64,
    pub version: String,
    pub os: String,
    pub extension: String,
}

/// Source of the published Julia releases
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Catalogue: Send + Sync {
    /// Fetches the full release catalogue
    async fn fetch_versions_json(&self) -> Result<VersionsJson, FetchError>;
}

/// Version strings of a catalogue, in document order
pub fn available_versions(versions: &VersionsJson) -> Vec<String> {
    versions.keys().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_versions_json_entries() {
        let json = serde_json::json!({
            "1.10.4": {
                "files": [{
                    "url": "https://julialang-s3.julialang.org/bin/linux/x64/1.10/julia-1.10.4-linux-x86_64.tar.gz",
                    "triplet": "x86_64-linux-gnu",
                    "kind": "archive",
                    "arch": "x86_64",
                    "asc": "-----BEGIN PGP SIGNATURE-----",
                    "sha256": "079f61757c3b5b40d2ade052b3cc4816f50f7ef6df668825772562b3746adff1",
                    "size": 174224365,
                    "version": "1.10.4",
                    "os": "linux",
                    "extension": "tar.gz"
                }],
                "stable": true
            },
            "1.11.0-rc1": {
                "files": [],
                "stable": false
            }
        });

        let versions: VersionsJson = serde_json::from_value(json).unwrap();

        assert_eq!(available_versions(&versions), vec!["1.10.4", "1.11.0-rc1"]);
        let file = &versions["1.10.4"].files[0];
        assert_eq!(file.triplet.as_deref(), Some("x86_64-linux-gnu"));
        assert_eq!(file.size, 174224365);
        assert!(!versions["1.11.0-rc1"].stable);
    }

    #[test]
    fn optional_download_fields_may_be_absent() {
        let json = serde_json::json!({
            "url": "https://julialang-s3.julialang.org/bin/winnt/x64/0.7/julia-0.7.0-win64.exe",
            "kind": "installer",
            "arch": "x86_64",
            "size": 0,
            "version": "0.7.0",
            "os": "winnt",
            "extension": "exe"
        });

        let download: Download = serde_json::from_value(json).unwrap();
        assert_eq!(download.triplet, None);
        assert_eq!(download.sha256, None);
    }
}
