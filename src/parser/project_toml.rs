//! Julia Project.toml / Manifest.toml parser
//!
//! Only two fields are of interest:
//! - `[compat] julia = "..."` in the project file
//! - top-level `julia_version = "..."` in the manifest file

use serde::Deserialize;
use tracing::warn;

use crate::parser::error::ParseError;

/// Fields read from a Julia project or manifest file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectToml {
    /// Raw `[compat] julia` entry
    pub julia_compat: Option<String>,
    /// Top-level `julia_version` (format v2 manifests only)
    pub julia_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Document {
    compat: Option<Compat>,
    julia_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Compat {
    julia: Option<String>,
}

/// Parser for Julia project and manifest files
pub struct ProjectTomlParser;

impl ProjectTomlParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, content: &str) -> Result<ProjectToml, ParseError> {
        let document: Document = toml::from_str(content).map_err(|e| {
            warn!("Failed to parse TOML content: {}", e);
            ParseError::InvalidToml(e.message().to_string())
        })?;

        Ok(ProjectToml {
            julia_compat: document.compat.and_then(|compat| compat.julia),
            julia_version: document.julia_version,
        })
    }
}

impl Default for ProjectTomlParser {
    fn default() -> Self {
        Self::new()
    }
}
