//! Version specifier input parser
//!
//! The `version` input is either a single specifier or a list of specifiers,
//! written as YAML (block list or JSON-style flow list). Scalars are read
//! verbatim from the syntax tree so numeric-looking text such as `1.10` is
//! never coerced into a number.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::parser::error::ParseError;

/// Grammar accepted for user supplied specifiers:
/// - numeric version or range: `1`, `1.2`, `1.2.3`, optionally prefixed with `^` or `~`
/// - nightly: `nightly` or `MAJOR.MINOR-nightly`
/// - aliases: `lts`, `min`, `manifest`
static SPECIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    let nr = r"(?:0|[1-9])[0-9]*";
    let numeric = format!(r"[\^~]?{nr}(?:\.{nr}(?:\.{nr})?)?");
    let nightly = format!(r"(?:{nr}\.{nr}-)?nightly");
    Regex::new(&format!(r"^(?:{numeric}|{nightly}|lts|min|manifest)$"))
        .expect("specifier grammar is a valid regex")
});

static NIGHTLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+\.\d+)-)?nightly$").expect("nightly pattern is a valid regex")
});

/// Named version aliases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alias {
    /// Latest release on the long-term support line
    Lts,
    /// Earliest release compatible with the project's `[compat]` entry
    Min,
    /// Version pinned by the project's manifest
    Manifest,
    /// Latest release including pre-releases (legacy, not accepted as input)
    Pre,
}

impl Alias {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alias::Lts => "lts",
            Alias::Min => "min",
            Alias::Manifest => "manifest",
            Alias::Pre => "pre",
        }
    }
}

/// A classified version specifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Specifier {
    /// A complete semantic version, optionally `v`-prefixed (`1.2.3`, `v1.3.0-rc1`)
    Exact(String),
    /// A version range (`1`, `^1.2`, `~1.2.3`, `>=1.6 <1.9`)
    Range(String),
    Alias(Alias),
    /// Nightly build, optionally on a release branch (`1.12-nightly`)
    Nightly(Option<String>),
}

impl Specifier {
    /// Classify a specifier string without validating it against the input grammar.
    ///
    /// Anything that is not a nightly, an alias or an exact version is treated
    /// as a range; an unparseable range simply matches nothing.
    pub fn classify(raw: &str) -> Self {
        if let Some(captures) = NIGHTLY_RE.captures(raw) {
            return Specifier::Nightly(captures.get(1).map(|m| m.as_str().to_string()));
        }

        match raw {
            "lts" => return Specifier::Alias(Alias::Lts),
            "min" => return Specifier::Alias(Alias::Min),
            "manifest" => return Specifier::Alias(Alias::Manifest),
            "pre" => return Specifier::Alias(Alias::Pre),
            _ => {}
        }

        let unprefixed = raw.strip_prefix('v').unwrap_or(raw);
        if semver::Version::parse(unprefixed).is_ok() {
            Specifier::Exact(raw.to_string())
        } else {
            Specifier::Range(raw.to_string())
        }
    }

    pub fn is_alias(&self, alias: Alias) -> bool {
        matches!(self, Specifier::Alias(a) if *a == alias)
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specifier::Exact(s) | Specifier::Range(s) => f.write_str(s),
            Specifier::Alias(alias) => f.write_str(alias.as_str()),
            Specifier::Nightly(Some(major_minor)) => write!(f, "{major_minor}-nightly"),
            Specifier::Nightly(None) => f.write_str("nightly"),
        }
    }
}

impl From<&str> for Specifier {
    fn from(raw: &str) -> Self {
        Specifier::classify(raw)
    }
}

/// Policy applied when a specifier resolves to no version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IfMissing {
    /// Log a warning and keep going with a placeholder
    Warn,
    /// Fail the whole batch
    #[default]
    Error,
}

impl FromStr for IfMissing {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warn" => Ok(IfMissing::Warn),
            "error" => Ok(IfMissing::Error),
            _ => Err(ParseError::InvalidIfMissing(s.to_string())),
        }
    }
}

/// Parse the raw `version` input into validated specifiers
pub fn parse_specifiers(raw: &str) -> Result<Vec<Specifier>, ParseError> {
    let raw = raw.trim();
    let values = parse_string_list(raw)?;

    values
        .iter()
        .map(|value| {
            if SPECIFIER_RE.is_match(value) {
                Ok(Specifier::classify(value))
            } else {
                Err(ParseError::InvalidSpecifier(value.clone()))
            }
        })
        .collect()
}

/// Read a YAML scalar or a YAML list of scalars as plain strings
fn parse_string_list(raw: &str) -> Result<Vec<String>, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    let language = tree_sitter_yaml::LANGUAGE;
    parser.set_language(&language.into()).map_err(|e| {
        warn!("Failed to set YAML language for tree-sitter: {}", e);
        ParseError::TreeSitter(e.to_string())
    })?;

    let unparsable = || ParseError::UnparsableInput(raw.to_string());

    let tree = parser.parse(raw, None).ok_or_else(unparsable)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(unparsable());
    }

    // stream -> exactly one document
    let documents = named_children(root);
    let [document] = documents.as_slice() else {
        return Err(unparsable());
    };
    let content = unwrap_node(*document).ok_or_else(unparsable)?;

    match content.kind() {
        "block_sequence" => named_children(content)
            .into_iter()
            .map(|item| {
                if item.kind() != "block_sequence_item" {
                    return None;
                }
                unwrap_node(item).and_then(|value| scalar_text(value, raw))
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(unparsable),
        "flow_sequence" => named_children(content)
            .into_iter()
            .map(|item| unwrap_node(item).and_then(|value| scalar_text(value, raw)))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(unparsable),
        _ => scalar_text(content, raw)
            .map(|value| vec![value])
            .ok_or_else(unparsable),
    }
}

/// Named children of a node, comments excluded
fn named_children(node: tree_sitter::Node) -> Vec<tree_sitter::Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Descend through wrapper nodes (`document`, `block_node`, `flow_node`,
/// `block_sequence_item`) to the node carrying the value.
///
/// Returns None when a wrapper carries anything besides a single value
/// (anchors, tags) or is empty.
fn unwrap_node(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    let mut current = node;
    while matches!(
        current.kind(),
        "document" | "block_node" | "flow_node" | "block_sequence_item"
    ) {
        let children = named_children(current);
        let [child] = children.as_slice() else {
            return None;
        };
        current = *child;
    }
    Some(current)
}

/// Text of a scalar node with quoting removed. None for non-scalar nodes.
fn scalar_text(node: tree_sitter::Node, content: &str) -> Option<String> {
    let text = content[node.byte_range()].trim();

    match node.kind() {
        "plain_scalar" => Some(text.to_string()),
        "double_quote_scalar" => {
            let inner = text.strip_prefix('"')?.strip_suffix('"')?;
            unescape_double_quoted(inner)
        }
        "single_quote_scalar" => {
            let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
            Some(inner.replace("''", "'"))
        }
        _ => None,
    }
}

/// Decode the YAML double-quoted escape set. None on an unknown escape.
fn unescape_double_quoted(inner: &str) -> Option<String> {
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        let decoded = match chars.next()? {
            '0' => '\0',
            'a' => '\u{07}',
            'b' => '\u{08}',
            't' | '\t' => '\t',
            'n' => '\n',
            'v' => '\u{0B}',
            'f' => '\u{0C}',
            'r' => '\r',
            'e' => '\u{1B}',
            ' ' => ' ',
            '"' => '"',
            '/' => '/',
            '\\' => '\\',
            'N' => '\u{85}',
            '_' => '\u{A0}',
            'L' => '\u{2028}',
            'P' => '\u{2029}',
            'x' => hex_char(&mut chars, 2)?,
            'u' => hex_char(&mut chars, 4)?,
            'U' => hex_char(&mut chars, 8)?,
            // Escaped line break: the break and the next line's indentation are dropped
            '\n' => {
                let rest = chars.as_str().trim_start_matches([' ', '\t']);
                chars = rest.chars();
                continue;
            }
            _ => return None,
        };
        result.push(decoded);
    }
    Some(result)
}

fn hex_char(chars: &mut std::str::Chars, digits: usize) -> Option<char> {
    let hex: String = chars.by_ref().take(digits).collect();
    if hex.len() != digits || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
}
