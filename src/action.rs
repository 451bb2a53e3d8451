//! GitHub Actions boundary
//!
//! Turns the raw `version`, `project` and `if-missing` inputs into a batch
//! resolution and the results into the `version` and `unique-version` outputs.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::parser::{IfMissing, ParseError, parse_specifiers};
use crate::version::batch::{BatchResolver, ResolveOptions};
use crate::version::error::ResolveError;
use crate::version::semver::{unique, version_sort};

/// Raw action inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInputs {
    pub version: String,
    pub project: PathBuf,
    pub if_missing: String,
}

impl ActionInputs {
    /// Project path from the `project` input, then `JULIA_PROJECT`, then `.`
    pub fn project_path(project: Option<&str>, julia_project: Option<&str>) -> PathBuf {
        project
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .or_else(|| julia_project.map(str::trim).filter(|p| !p.is_empty()))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Named action outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutputs {
    /// One entry per specifier, `null` for unresolved ones
    pub version: Vec<Option<String>>,
    /// Resolved versions without duplicates, sorted
    pub unique_version: Vec<String>,
    /// Specifiers that resolved to nothing under the `warn` policy
    pub missing: Vec<String>,
}

impl ActionOutputs {
    pub fn from_resolved(resolved: Vec<Option<String>>) -> Self {
        let found: Vec<String> = resolved.iter().flatten().cloned().collect();
        let unique_version = version_sort(unique(&found));
        Self {
            version: resolved,
            unique_version,
            missing: Vec::new(),
        }
    }

    /// One `::warning::` workflow command per missing specifier
    pub fn warning_annotations(&self) -> Vec<String> {
        self.missing
            .iter()
            .map(|specifier| {
                workflow_command(
                    "warning",
                    &ResolveError::NoMatchingVersion(specifier.clone()),
                )
            })
            .collect()
    }

    /// `name=value` lines with JSON encoded values
    pub fn to_lines(&self) -> Result<String, serde_json::Error> {
        Ok(format!(
            "version={}\nunique-version={}\n",
            serde_json::to_string(&self.version)?,
            serde_json::to_string(&self.unique_version)?
        ))
    }

    /// Append the outputs to `destination`, or print them when there is none
    pub fn write(&self, destination: Option<&Path>) -> anyhow::Result<()> {
        let lines = self.to_lines()?;
        match destination {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(lines.as_bytes())?;
            }
            None => print!("{lines}"),
        }
        Ok(())
    }
}

/// Validate the inputs and resolve every specifier
pub async fn run(
    inputs: &ActionInputs,
    resolver: &BatchResolver,
) -> Result<ActionOutputs, ResolveError> {
    let specifiers = parse_specifiers(&inputs.version)?;
    let if_missing = parse_if_missing(&inputs.if_missing)?;

    debug!(
        "version input: {:?}, project: {}, if-missing: {:?}",
        specifiers.iter().map(ToString::to_string).collect::<Vec<_>>(),
        inputs.project.display(),
        if_missing
    );

    let resolved = resolver
        .resolve_versions(&specifiers, &inputs.project, ResolveOptions { if_missing })
        .await?;

    let missing = specifiers
        .iter()
        .zip(&resolved)
        .filter(|(_, version)| version.is_none())
        .map(|(specifier, _)| specifier.to_string())
        .collect();

    Ok(ActionOutputs {
        missing,
        ..ActionOutputs::from_resolved(resolved)
    })
}

/// An unset input arrives as an empty string and means the default policy
fn parse_if_missing(raw: &str) -> Result<IfMissing, ParseError> {
    match raw.trim() {
        "" => Ok(IfMissing::default()),
        value => value.parse(),
    }
}

/// Workflow command reporting a failure
pub fn error_annotation(err: &dyn Display) -> String {
    workflow_command("error", err)
}

fn workflow_command(name: &str, message: &dyn Display) -> String {
    let message = message
        .to_string()
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::{name}::{message}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(Some("/work/Example"), Some("/env"), "/work/Example")]
    #[case(Some(""), Some("/env"), "/env")]
    #[case(None, Some(" /env "), "/env")]
    #[case(None, Some(""), ".")]
    #[case(None, None, ".")]
    fn project_path_falls_back_to_julia_project(
        #[case] project: Option<&str>,
        #[case] julia_project: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(
            ActionInputs::project_path(project, julia_project),
            PathBuf::from(expected)
        );
    }

    #[test]
    fn from_resolved_drops_missing_and_sorts_unique_versions() {
        let outputs = ActionOutputs::from_resolved(vec![
            Some("1.10.4".to_string()),
            None,
            Some("1.6.7".to_string()),
            Some("1.10.4".to_string()),
            Some("1.11-nightly".to_string()),
        ]);

        assert_eq!(outputs.version.len(), 5);
        assert_eq!(
            outputs.unique_version,
            strings(&["1.6.7", "1.10.4", "1.11-nightly"])
        );
    }

    #[test]
    fn to_lines_encodes_values_as_json() {
        let outputs = ActionOutputs::from_resolved(vec![Some("1.10.4".to_string()), None]);

        assert_eq!(
            outputs.to_lines().unwrap(),
            "version=[\"1.10.4\",null]\nunique-version=[\"1.10.4\"]\n"
        );
    }

    #[test]
    fn write_appends_to_output_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "previous=1\n").unwrap();

        ActionOutputs::from_resolved(vec![Some("1.6.7".to_string())])
            .write(Some(&path))
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "previous=1\nversion=[\"1.6.7\"]\nunique-version=[\"1.6.7\"]\n"
        );
    }

    #[rstest]
    #[case("", IfMissing::Error)]
    #[case("  ", IfMissing::Error)]
    #[case("warn", IfMissing::Warn)]
    #[case(" error\n", IfMissing::Error)]
    fn parse_if_missing_defaults_when_unset(#[case] raw: &str, #[case] expected: IfMissing) {
        assert_eq!(parse_if_missing(raw).unwrap(), expected);
    }

    #[test]
    fn warning_annotations_name_each_missing_specifier() {
        let outputs = ActionOutputs {
            missing: strings(&["1.9-nightly"]),
            ..ActionOutputs::from_resolved(vec![None, Some("1.6.7".to_string())])
        };

        assert_eq!(
            outputs.warning_annotations(),
            vec!["::warning::No Julia version exists matching specifier: \"1.9-nightly\""]
        );
    }

    #[test]
    fn error_annotation_escapes_newlines() {
        let err = ResolveError::from(ParseError::UnparsableInput("a: 1".to_string()));
        assert_eq!(
            error_annotation(&err),
            "::error::Unable to parse \"version\" input:%0Aa: 1"
        );
    }
}
