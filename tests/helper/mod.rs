//! Test collaborators for batch resolution

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use julia_version::version::batch::BatchResolver;
use julia_version::version::catalogue::{Catalogue, VersionsJson};
use julia_version::version::error::FetchError;
use julia_version::version::nightly::NightlyProber;
use julia_version::version::resolver::VersionResolver;

/// Path of a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Catalogue serving `tests/fixtures/versions.json`
pub struct FixtureCatalogue {
    fetches: AtomicUsize,
}

impl FixtureCatalogue {
    pub fn new() -> Self {
        Self {
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Catalogue for FixtureCatalogue {
    async fn fetch_versions_json(&self) -> Result<VersionsJson, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let content = tokio::fs::read_to_string(fixture_path("versions.json"))
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }
}

/// Prober reporting nightlies only for the listed release branches
pub struct StubNightlyProber {
    existing: Vec<String>,
}

impl StubNightlyProber {
    pub fn new(existing: &[&str]) -> Self {
        Self {
            existing: existing.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl NightlyProber for StubNightlyProber {
    async fn probe(&self, major_minor: &str) -> Result<bool, FetchError> {
        Ok(self.existing.iter().any(|v| v == major_minor))
    }
}

/// Batch resolver over the fixture catalogue with nightlies for 1.10, 1.11 and 1.12
pub fn create_test_resolver() -> (Arc<FixtureCatalogue>, BatchResolver) {
    let catalogue = Arc::new(FixtureCatalogue::new());
    let resolver = BatchResolver::new(
        catalogue.clone(),
        Arc::new(StubNightlyProber::new(&["1.10", "1.11", "1.12"])),
        VersionResolver::default(),
    );
    (catalogue, resolver)
}
