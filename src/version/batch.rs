//! Batch resolution of specifiers
//!
//! Project metadata is read once per batch and only when a specifier needs
//! it. The catalogue is fetched once. Specifiers are then resolved in order.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::parser::{Alias, IfMissing, Specifier};
use crate::project::{load_compat_range, load_manifest_version};
use crate::version::catalogue::{Catalogue, available_versions};
use crate::version::error::ResolveError;
use crate::version::nightly::NightlyProber;
use crate::version::resolver::VersionResolver;

/// Options for a batch resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub if_missing: IfMissing,
}

/// Resolves a list of specifiers against the catalogue and nightly builds
pub struct BatchResolver {
    catalogue: Arc<dyn Catalogue>,
    prober: Arc<dyn NightlyProber>,
    resolver: VersionResolver,
}

impl BatchResolver {
    pub fn new(
        catalogue: Arc<dyn Catalogue>,
        prober: Arc<dyn NightlyProber>,
        resolver: VersionResolver,
    ) -> Self {
        Self {
            catalogue,
            prober,
            resolver,
        }
    }

    /// Resolve every specifier, preserving input order.
    ///
    /// With [`IfMissing::Warn`] unresolved specifiers yield `None`; with
    /// [`IfMissing::Error`] the first one aborts the batch.
    pub async fn resolve_versions(
        &self,
        specifiers: &[Specifier],
        project: &Path,
        options: ResolveOptions,
    ) -> Result<Vec<Option<String>>, ResolveError> {
        let compat = if specifiers.iter().any(|s| s.is_alias(Alias::Min)) {
            Some(load_compat_range(project).await?)
        } else {
            None
        };

        let manifest = if specifiers.iter().any(|s| s.is_alias(Alias::Manifest)) {
            load_manifest_version(project).await?
        } else {
            None
        };

        let versions = self.catalogue.fetch_versions_json().await?;
        let available = available_versions(&versions);

        let mut resolved_versions = Vec::with_capacity(specifiers.len());
        for specifier in specifiers {
            let resolved = match specifier {
                Specifier::Nightly(Some(major_minor)) => self
                    .prober
                    .probe(major_minor)
                    .await?
                    .then(|| specifier.to_string()),
                // The unversioned nightly is always published
                Specifier::Nightly(None) => Some(specifier.to_string()),
                _ => self.resolver.resolve(
                    specifier,
                    &available,
                    compat.as_ref(),
                    manifest.as_deref(),
                )?,
            };

            debug!("{} -> {:?}", specifier, resolved);

            match (resolved, options.if_missing) {
                (Some(version), _) => resolved_versions.push(Some(version)),
                (None, IfMissing::Warn) => {
                    warn!("No Julia version exists matching specifier: \"{}\"", specifier);
                    resolved_versions.push(None);
                }
                (None, IfMissing::Error) => {
                    return Err(ResolveError::NoMatchingVersion(specifier.to_string()));
                }
            }
        }

        Ok(resolved_versions)
    }
}
