//! Julia nightly builds
//!
//! Nightlies are not listed in `versions.json`. Their existence is checked
//! by probing the deterministic artifact URL instead.

#[cfg(test)]
use mockall::automock;

use crate::version::error::FetchError;

/// A platform nightlies are published for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightlyPlatform {
    pub platform: &'static str,
    pub arch: &'static str,
    /// Overrides the `<platform>-<arch>` part of the artifact name
    pub suffix: Option<&'static str>,
    pub ext: &'static str,
}

pub static NIGHTLY_PLATFORMS: &[NightlyPlatform] = &[
    NightlyPlatform::with_suffix("winnt", "x64", "win64", "tar.gz"),
    NightlyPlatform::with_suffix("winnt", "x64", "win64", "exe"),
    NightlyPlatform::with_suffix("winnt", "x86", "win32", "tar.gz"),
    NightlyPlatform::with_suffix("winnt", "x86", "win32", "exe"),
    NightlyPlatform::new("macos", "aarch64", "tar.gz"),
    NightlyPlatform::new("macos", "aarch64", "dmg"),
    NightlyPlatform::new("macos", "x86_64", "tar.gz"),
    NightlyPlatform::new("macos", "x86_64", "dmg"),
    NightlyPlatform::new("linux", "x86_64", "tar.gz"),
    NightlyPlatform::new("linux", "aarch64", "tar.gz"),
    NightlyPlatform::new("linux", "i686", "tar.gz"),
    NightlyPlatform::new("freebsd", "x86_64", "tar.gz"),
];

pub const DEFAULT_NIGHTLY_PLATFORM: NightlyPlatform =
    NightlyPlatform::new("linux", "x86_64", "tar.gz");

impl NightlyPlatform {
    pub const fn new(platform: &'static str, arch: &'static str, ext: &'static str) -> Self {
        Self {
            platform,
            arch,
            suffix: None,
            ext,
        }
    }

    pub const fn with_suffix(
        platform: &'static str,
        arch: &'static str,
        suffix: &'static str,
        ext: &'static str,
    ) -> Self {
        Self {
            platform,
            arch,
            suffix: Some(suffix),
            ext,
        }
    }

    /// First table entry for a platform/arch pair
    pub fn find(platform: &str, arch: &str) -> Option<Self> {
        NIGHTLY_PLATFORMS
            .iter()
            .find(|p| p.platform == platform && p.arch == arch)
            .copied()
    }

    /// Download kind as reported in `versions.json`
    pub fn kind(&self) -> &'static str {
        match self.ext {
            "exe" => "installer",
            "tar.gz" | "zip" | "dmg" => "archive",
            _ => "unknown",
        }
    }

    /// Artifact URL, optionally on a release branch (`1.12`)
    pub fn url(&self, base_url: &str, major_minor: Option<&str>) -> String {
        let dir = major_minor.map(|mm| format!("{mm}/")).unwrap_or_default();
        let suffix = match self.suffix {
            Some(suffix) => suffix.to_string(),
            None => format!("{}-{}", self.platform, self.arch),
        };
        format!(
            "{}/{}/{}/{}julia-latest-{}.{}",
            base_url.trim_end_matches('/'),
            self.platform,
            self.arch,
            dir,
            suffix,
            self.ext
        )
    }
}

/// Checks whether a nightly build exists
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait NightlyProber: Send + Sync {
    /// Whether a nightly exists on the `major_minor` release branch (e.g. `1.12`).
    ///
    /// Unexpected responses are reported as absent; only transport failures
    /// are errors.
    async fn probe(&self, major_minor: &str) -> Result<bool, FetchError>;
}
