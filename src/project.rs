//! Julia project and manifest file lookup
//!
//! A project may be given as a file or a directory. Directories are searched
//! for `JuliaProject.toml` then `Project.toml`; manifests are searched next
//! to the project file as `JuliaManifest.toml` then `Manifest.toml`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::parser::{ProjectToml, ProjectTomlParser};
use crate::version::compat::translate_compat_range;
use crate::version::error::ResolveError;
use crate::version::range::VersionRange;

pub const PROJECT_FILENAMES: [&str; 2] = ["JuliaProject.toml", "Project.toml"];
pub const MANIFEST_FILENAMES: [&str; 2] = ["JuliaManifest.toml", "Manifest.toml"];

/// Find the project file for a project path
pub fn find_project_file(project: &Path) -> Result<PathBuf, ResolveError> {
    locate(project, &PROJECT_FILENAMES)
        .ok_or_else(|| ResolveError::ProjectFileNotFound(project.to_path_buf()))
}

/// Find the manifest file belonging to a project path
pub fn find_manifest_file(project: &Path) -> Result<PathBuf, ResolveError> {
    let dir = if project.is_file() {
        project.parent().unwrap_or(Path::new("."))
    } else {
        project
    };

    MANIFEST_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ResolveError::ManifestFileNotFound(project.to_path_buf()))
}

/// A file path is used as is; a directory is searched for `names` in order
fn locate(path: &Path, names: &[&str]) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if !path.is_dir() {
        return None;
    }

    names
        .iter()
        .map(|name| path.join(name))
        .find(|candidate| candidate.is_file())
}

/// Read and parse a Julia TOML file
pub async fn read_toml(path: &Path) -> Result<ProjectToml, ResolveError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(ProjectTomlParser::new().parse(&content)?)
}

/// Compat range declared for Julia by a parsed project file.
///
/// A missing entry means any version.
pub fn compat_range_from_project(project: &ProjectToml) -> Result<VersionRange, ResolveError> {
    let Some(raw) = project.julia_compat.as_deref() else {
        return Ok(VersionRange::any());
    };

    translate_compat_range(raw).ok_or_else(|| ResolveError::InvalidCompatRange(raw.to_string()))
}

/// Locate the project file, read it and translate its Julia compat entry
pub async fn load_compat_range(project: &Path) -> Result<VersionRange, ResolveError> {
    let path = find_project_file(project)?;
    let parsed = read_toml(&path).await?;
    let range = compat_range_from_project(&parsed)?;
    debug!("Julia compat range from {}: {}", path.display(), range);
    Ok(range)
}

/// Locate the manifest file and read the Julia version it was resolved with
pub async fn load_manifest_version(project: &Path) -> Result<Option<String>, ResolveError> {
    let path = find_manifest_file(project)?;
    let parsed = read_toml(&path).await?;
    debug!(
        "Julia version from {}: {:?}",
        path.display(),
        parsed.julia_version
    );
    Ok(parsed.julia_version)
}
