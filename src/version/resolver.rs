//! Single specifier resolution
//!
//! Resolves one classified specifier against the catalogue's version list:
//! - exact versions: verbatim catalogue entry, prefix-insensitive
//! - `min`: lowest entry satisfying the project's compat range
//! - `lts`: highest entry on the long-term support line
//! - `manifest`: the manifest pin, unchecked
//! - ranges: highest satisfying entry
//!
//! No match is `Ok(None)`. The caller decides whether that is fatal.

use crate::config::LTS_VERSION;
use crate::parser::{Alias, Specifier};
use crate::version::error::ResolveError;
use crate::version::range::{InvalidRange, VersionRange};
use crate::version::semver::parse_release;

/// Resolves specifiers against a list of available versions
#[derive(Debug, Clone)]
pub struct VersionResolver {
    lts_range: VersionRange,
}

impl VersionResolver {
    /// Creates a resolver whose `lts` alias follows the given release line (e.g. `1.10`)
    pub fn new(lts_line: &str) -> Result<Self, InvalidRange> {
        Ok(Self {
            lts_range: VersionRange::parse(lts_line)?,
        })
    }

    pub fn lts_range(&self) -> &VersionRange {
        &self.lts_range
    }

    /// Resolve a specifier to a catalogue entry.
    ///
    /// # Arguments
    /// * `specifier` - The classified specifier
    /// * `available` - Catalogue version strings
    /// * `compat` - Project compat range, required for `min`
    /// * `manifest` - Julia version pinned by the project manifest
    ///
    /// # Returns
    /// * `Ok(Some(version))` - The catalogue entry (or manifest pin) that was selected
    /// * `Ok(None)` - Nothing matched
    /// * `Err(ResolveError::MissingCompatRange)` - `min` without a compat range
    pub fn resolve(
        &self,
        specifier: &Specifier,
        available: &[String],
        compat: Option<&VersionRange>,
        manifest: Option<&str>,
    ) -> Result<Option<String>, ResolveError> {
        let resolved = match specifier {
            Specifier::Exact(version) => find_exact(version, available),
            Specifier::Alias(Alias::Min) => {
                let compat = compat.ok_or(ResolveError::MissingCompatRange)?;
                compat.min_satisfying(available).cloned()
            }
            Specifier::Alias(Alias::Lts) => self.lts_range.max_satisfying(available).cloned(),
            Specifier::Alias(Alias::Manifest) => manifest
                .filter(|pin| !pin.is_empty())
                .map(str::to_string),
            Specifier::Alias(Alias::Pre) => find_latest_including_prereleases(available),
            // Bare numerals keep tilde semantics here: "1.7" is ~1.7, not ^1.7
            Specifier::Range(range) => VersionRange::parse(range)
                .ok()
                .and_then(|range| range.max_satisfying(available).cloned()),
            Specifier::Nightly(_) => None,
        };

        Ok(resolved)
    }
}

impl Default for VersionResolver {
    fn default() -> Self {
        Self {
            lts_range: VersionRange::parse(LTS_VERSION).unwrap_or_else(|_| VersionRange::any()),
        }
    }
}

/// Catalogue entry equal to an exact version, ignoring a `v` prefix on either side.
///
/// A verbatim match takes priority over a prefix-insensitive one.
fn find_exact(version: &str, available: &[String]) -> Option<String> {
    if let Some(entry) = available.iter().find(|entry| *entry == version) {
        return Some(entry.clone());
    }

    let wanted = parse_release(version)?;
    available
        .iter()
        .find(|entry| {
            parse_release(entry).is_some_and(|parsed| {
                parsed.cmp_precedence(&wanted).is_eq() && parsed.build == wanted.build
            })
        })
        .cloned()
}

/// Highest parseable entry, pre-releases included
fn find_latest_including_prereleases(available: &[String]) -> Option<String> {
    available
        .iter()
        .filter_map(|entry| parse_release(entry).map(|parsed| (entry, parsed)))
        .reduce(|best, candidate| {
            if candidate.1.cmp_precedence(&best.1).is_gt() {
                candidate
            } else {
                best
            }
        })
        .map(|(entry, _)| entry.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn resolve(
        specifier: &str,
        available: &[&str],
        compat: Option<&str>,
    ) -> Result<Option<String>, ResolveError> {
        let compat = compat.map(|c| VersionRange::parse(c).unwrap());
        VersionResolver::default().resolve(
            &Specifier::classify(specifier),
            &strings(available),
            compat.as_ref(),
            None,
        )
    }

    #[rstest]
    #[case("1.0.5", &["v1.0.5", "v1.0.6"], Some("v1.0.5"))]
    #[case("v1.0.5", &["1.0.5", "1.0.6"], Some("1.0.5"))]
    #[case("1.0.5", &["1.0.5", "v1.0.5"], Some("1.0.5"))]
    #[case("1.0.5", &["v1.0.5", "1.0.5"], Some("1.0.5"))]
    #[case("1.0.5", &[], None)]
    #[case("1.0.5", &["1.0.6"], None)]
    #[case("1.3.0-rc1", &["1.2.0", "1.3.0-rc1"], Some("1.3.0-rc1"))]
    fn resolve_exact_versions(
        #[case] specifier: &str,
        #[case] available: &[&str],
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(
            resolve(specifier, available, None).unwrap(),
            expected.map(str::to_string)
        );
    }

    #[rstest]
    #[case(
        &["1.6.7", "1.7.1-rc1", "1.7.1-rc2", "1.7.1", "1.7.2", "1.8.0"],
        "^1.7",
        Some("1.7.1")
    )]
    #[case(&["1.6.7", "1.7.3-rc1", "1.7.3-rc2", "1.8.0"], "^1.7", Some("1.8.0"))]
    #[case(&["1.6.7", "1.7.3-rc1", "1.7.3-rc2", "1.8.0"], "~1.7 || ~1.8 || ~1.9", Some("1.8.0"))]
    #[case(&["1.6.7", "1.7.3-rc1", "1.7.3-rc2", "1.8.0"], "~1.7 || 1.8 || ~1.9", Some("1.8.0"))]
    #[case(&["1.6.7", "1.7.3-rc1", "1.7.3-rc2", "1.8.0"], "1.7 - 1.9", Some("1.8.0"))]
    #[case(&["1.6.7", "1.7.3-rc1", "1.7.3-rc2", "1.8.0"], "< 1.9.0", Some("1.6.7"))]
    #[case(&["1.6.7", "1.7.3-rc1", "1.7.3-rc2", "1.8.0"], ">= 1.6.0", Some("1.6.7"))]
    #[case(&["1.6.7", "1.7.3-rc1", "1.7.3-rc2", "1.8.0"], "1.7", None)]
    #[case(&["1.6.7", "1.8.0"], "*", Some("1.6.7"))]
    fn resolve_min_picks_lowest_compatible(
        #[case] available: &[&str],
        #[case] compat: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(
            resolve("min", available, Some(compat)).unwrap(),
            expected.map(str::to_string)
        );
    }

    #[test]
    fn resolve_min_requires_compat_range() {
        let err = resolve("min", &["1.6.7"], None).unwrap_err();
        assert!(matches!(err, ResolveError::MissingCompatRange));
    }

    #[rstest]
    #[case(&["1.9.4", "1.10.0", "1.10.4", "1.11.0-rc1", "1.11.0"], Some("1.10.4"))]
    #[case(&["1.10.0-rc1", "1.10.0-rc2", "1.9.4"], None)]
    #[case(&["1.11.0"], None)]
    fn resolve_lts_uses_lts_line(#[case] available: &[&str], #[case] expected: Option<&str>) {
        assert_eq!(
            resolve("lts", available, None).unwrap(),
            expected.map(str::to_string)
        );
    }

    #[test]
    fn resolve_lts_follows_configured_line() {
        let resolver = VersionResolver::new("1.6").unwrap();
        let available = strings(&["1.6.6", "1.6.7", "1.10.4"]);
        let resolved = resolver
            .resolve(&Specifier::Alias(Alias::Lts), &available, None, None)
            .unwrap();
        assert_eq!(resolved, Some("1.6.7".to_string()));
    }

    #[rstest]
    #[case(Some("1.10.4"), Some("1.10.4"))]
    #[case(Some("1.99.0"), Some("1.99.0"))]
    #[case(Some(""), None)]
    #[case(None, None)]
    fn resolve_manifest_returns_pin_verbatim(
        #[case] manifest: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let available = strings(&["1.10.4"]);
        let resolved = VersionResolver::default()
            .resolve(&Specifier::Alias(Alias::Manifest), &available, None, manifest)
            .unwrap();
        assert_eq!(resolved, expected.map(str::to_string));
    }

    #[rstest]
    #[case("1", Some("1.11.1"))]
    #[case("^1.10", Some("1.11.1"))]
    #[case("~1.10", Some("1.10.5"))]
    #[case("1.10", Some("1.10.5"))]
    #[case("1.10.0", Some("1.10.0"))]
    #[case("^1.12.0-rc1", Some("1.12.0-rc2"))]
    #[case("2", None)]
    #[case("not a range", None)]
    fn resolve_ranges_pick_highest_match(#[case] specifier: &str, #[case] expected: Option<&str>) {
        let available = [
            "1.9.4",
            "1.10.0",
            "1.10.5",
            "1.11.0",
            "1.11.1",
            "1.12.0-rc1",
            "1.12.0-rc2",
        ];
        assert_eq!(
            resolve(specifier, &available, None).unwrap(),
            expected.map(str::to_string)
        );
    }

    #[test]
    fn resolve_pre_includes_prereleases() {
        let resolved = resolve("pre", &["1.11.1", "1.12.0-rc2", "1.12.0-rc1"], None).unwrap();
        assert_eq!(resolved, Some("1.12.0-rc2".to_string()));
    }

    #[test]
    fn resolve_nightly_is_left_to_caller() {
        assert_eq!(resolve("nightly", &["1.10.4"], None).unwrap(), None);
    }

    #[test]
    fn default_lts_range_tracks_lts_version() {
        assert_eq!(
            VersionResolver::default().lts_range().to_string(),
            ">=1.10.0 <1.11.0-0"
        );
    }
}
