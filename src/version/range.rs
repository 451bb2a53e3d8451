//! npm-style version ranges
//!
//! Supports the node-semver range grammar:
//! - `1.2.3`, `=1.2.3` - exact match
//! - `^1.2.3` - compatible with version (>=1.2.3 <2.0.0)
//! - `~1.2.3`, `~>1.2.3` - approximately equivalent (>=1.2.3 <1.3.0)
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//! - `1.2.x`, `1.x`, `1.2`, `1`, `*` - wildcards and partial versions
//! - `1.2.3 - 2.3.4` - hyphen ranges
//! - `>=1.0.0 <2.0.0` - AND (space separated)
//! - `^1.0.0 || ^2.0.0` - OR
//!
//! Every range is desugared into comparator sets on parse. A version with a
//! pre-release tag only satisfies a set when one of the set's comparators
//! carries a pre-release on the same `major.minor.patch`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};

use crate::version::semver::parse_release;

static HYPHEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\S+)\s+-\s+(\S+)\s*$").expect("hyphen pattern is a valid regex")
});

/// Error returned for text that is not a valid range
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid version range: \"{0}\"")]
pub struct InvalidRange(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Op {
    fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
        }
    }
}

/// A single primitive comparison such as `>=1.2.0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    fn matches(&self, version: &Version) -> bool {
        let ordering = version.cmp_precedence(&self.version);
        match self.op {
            Op::Eq => ordering == Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)
    }
}

/// A parsed version range: an OR of comparator sets, each an AND of comparators.
///
/// An empty comparator set matches every release (`*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    sets: Vec<Vec<Comparator>>,
}

impl VersionRange {
    /// Range matching every release
    pub fn any() -> Self {
        Self {
            sets: vec![Vec::new()],
        }
    }

    pub fn parse(range: &str) -> Result<Self, InvalidRange> {
        let invalid = || InvalidRange(range.to_string());

        let sets = range
            .split("||")
            .map(|part| parse_comparator_set(part.trim()).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { sets })
    }

    /// Check if a version satisfies this range
    pub fn satisfies(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| set_satisfies(set, version))
    }

    /// Highest entry satisfying the range, returned verbatim.
    ///
    /// Entries that are not valid versions are skipped; on ties the first
    /// entry wins.
    pub fn max_satisfying<'a>(&self, versions: &'a [String]) -> Option<&'a String> {
        self.satisfying(versions)
            .reduce(|best, candidate| {
                if candidate.1.cmp_precedence(&best.1) == Ordering::Greater {
                    candidate
                } else {
                    best
                }
            })
            .map(|(original, _)| original)
    }

    /// Lowest entry satisfying the range, returned verbatim
    pub fn min_satisfying<'a>(&self, versions: &'a [String]) -> Option<&'a String> {
        self.satisfying(versions)
            .reduce(|best, candidate| {
                if candidate.1.cmp_precedence(&best.1) == Ordering::Less {
                    candidate
                } else {
                    best
                }
            })
            .map(|(original, _)| original)
    }

    fn satisfying<'a>(
        &self,
        versions: &'a [String],
    ) -> impl Iterator<Item = (&'a String, Version)> {
        versions.iter().filter_map(move |v| {
            parse_release(v)
                .filter(|parsed| self.satisfies(parsed))
                .map(|parsed| (v, parsed))
        })
    }
}

impl FromStr for VersionRange {
    type Err = InvalidRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, set) in self.sets.iter().enumerate() {
            if i > 0 {
                f.write_str("||")?;
            }
            if set.is_empty() {
                f.write_str("*")?;
                continue;
            }
            for (j, comparator) in set.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{comparator}")?;
            }
        }
        Ok(())
    }
}

fn set_satisfies(set: &[Comparator], version: &Version) -> bool {
    if !set.iter().all(|c| c.matches(version)) {
        return false;
    }

    if version.pre.is_empty() {
        return true;
    }

    // Pre-releases only match when explicitly opted into on the same tuple
    set.iter().any(|c| {
        !c.version.pre.is_empty()
            && c.version.major == version.major
            && c.version.minor == version.minor
            && c.version.patch == version.patch
    })
}

/// Parse a comparator set (no `||`). Returns None if any part is invalid.
fn parse_comparator_set(spec: &str) -> Option<Vec<Comparator>> {
    if spec.is_empty() {
        return Some(Vec::new());
    }

    if let Some(captures) = HYPHEN_RE.captures(spec) {
        let from = PartialVersion::parse(&captures[1])?;
        let to = PartialVersion::parse(&captures[2])?;
        return Some(desugar_hyphen(&from, &to));
    }

    let mut comparators = Vec::new();
    for token in merge_operator_tokens(spec) {
        comparators.extend(parse_comparator(&token)?);
    }
    Some(comparators)
}

/// Split on whitespace, re-attaching operators separated from their version
/// (`>= 1.2` -> `>=1.2`, `^ 1.2` -> `^1.2`).
fn merge_operator_tokens(spec: &str) -> Vec<String> {
    const OPERATORS: [&str; 8] = [">=", "<=", ">", "<", "=", "~>", "~", "^"];

    let mut tokens = Vec::new();
    let mut pending: Option<String> = None;

    for word in spec.split_whitespace() {
        let token = match pending.take() {
            Some(op) => format!("{op}{word}"),
            None => word.to_string(),
        };
        if OPERATORS.contains(&token.as_str()) {
            pending = Some(token);
        } else {
            tokens.push(token);
        }
    }

    // A dangling operator is kept so that it fails to parse
    if let Some(op) = pending {
        tokens.push(op);
    }

    tokens
}

/// Parse a single comparator token into zero (any), one or two comparators
fn parse_comparator(token: &str) -> Option<Vec<Comparator>> {
    if let Some(rest) = token.strip_prefix("~>") {
        return PartialVersion::parse(rest).map(|p| desugar_tilde(&p));
    }
    if let Some(rest) = token.strip_prefix('~') {
        return PartialVersion::parse(rest).map(|p| desugar_tilde(&p));
    }
    if let Some(rest) = token.strip_prefix('^') {
        return PartialVersion::parse(rest).map(|p| desugar_caret(&p));
    }

    let (op, rest) = if let Some(rest) = token.strip_prefix(">=") {
        (Some(Op::Gte), rest)
    } else if let Some(rest) = token.strip_prefix("<=") {
        (Some(Op::Lte), rest)
    } else if let Some(rest) = token.strip_prefix('>') {
        (Some(Op::Gt), rest)
    } else if let Some(rest) = token.strip_prefix('<') {
        (Some(Op::Lt), rest)
    } else if let Some(rest) = token.strip_prefix('=') {
        (Some(Op::Eq), rest)
    } else {
        (None, token)
    };

    PartialVersion::parse(rest).map(|p| desugar_primitive(op, &p))
}

/// A possibly incomplete version; `None` components are wildcards (`x`, `*`, missing)
#[derive(Debug, Clone, PartialEq, Eq)]
struct PartialVersion {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl PartialVersion {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim_start_matches(['v', '=']);
        if text.is_empty() {
            return None;
        }

        let (main, build) = match text.split_once('+') {
            Some((main, build)) => (main, Some(build)),
            None => (text, None),
        };
        let (core, pre) = match main.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (main, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return None;
        }
        let mut components = [None; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = parse_component(part)?;
        }

        // Pre-release and build metadata are only valid after a patch component
        if (pre.is_some() || build.is_some()) && parts.len() != 3 {
            return None;
        }
        if let Some(build) = build {
            BuildMetadata::new(build).ok()?;
        }
        let pre = match pre {
            Some(pre) => Prerelease::new(pre).ok()?,
            None => Prerelease::EMPTY,
        };

        Some(Self {
            major: components[0],
            minor: components[1],
            patch: components[2],
            pre,
        })
    }

    fn is_x_major(&self) -> bool {
        self.major.is_none()
    }

    fn is_x_minor(&self) -> bool {
        self.is_x_major() || self.minor.is_none()
    }

    fn is_x_patch(&self) -> bool {
        self.is_x_minor() || self.patch.is_none()
    }

    fn major(&self) -> u64 {
        self.major.unwrap_or(0)
    }

    fn minor(&self) -> u64 {
        self.minor.unwrap_or(0)
    }

    fn patch(&self) -> u64 {
        self.patch.unwrap_or(0)
    }

    fn full(&self) -> Version {
        version(self.major(), self.minor(), self.patch(), self.pre.clone())
    }
}

/// Parse one dotted component. `Some(None)` is a wildcard, `None` is invalid.
fn parse_component(part: &str) -> Option<Option<u64>> {
    match part {
        "x" | "X" | "*" => Some(None),
        "0" => Some(Some(0)),
        _ if !part.is_empty()
            && !part.starts_with('0')
            && part.bytes().all(|b| b.is_ascii_digit()) =>
        {
            part.parse().ok().map(Some)
        }
        _ => None,
    }
}

fn version(major: u64, minor: u64, patch: u64, pre: Prerelease) -> Version {
    Version {
        major,
        minor,
        patch,
        pre,
        build: BuildMetadata::EMPTY,
    }
}

fn release(major: u64, minor: u64, patch: u64) -> Version {
    version(major, minor, patch, Prerelease::EMPTY)
}

/// Lowest possible pre-release of a version (`X.Y.Z-0`), used for exclusive upper bounds
fn lowest(major: u64, minor: u64, patch: u64) -> Version {
    version(major, minor, patch, zero_prerelease())
}

fn zero_prerelease() -> Prerelease {
    Prerelease::new("0").expect("\"0\" is a valid pre-release")
}

/// Comparator that matches nothing
fn nothing() -> Vec<Comparator> {
    vec![Comparator::new(Op::Lt, lowest(0, 0, 0))]
}

fn bounded(lower: Version, upper: Version) -> Vec<Comparator> {
    vec![
        Comparator::new(Op::Gte, lower),
        Comparator::new(Op::Lt, upper),
    ]
}

/// `^1.2.3` := `>=1.2.3 <2.0.0-0`, `^0.2.3` := `>=0.2.3 <0.3.0-0`, `^0.0.3` := `>=0.0.3 <0.0.4-0`
fn desugar_caret(p: &PartialVersion) -> Vec<Comparator> {
    let (major, minor, patch) = (p.major(), p.minor(), p.patch());

    if p.is_x_major() {
        Vec::new()
    } else if p.is_x_minor() {
        bounded(release(major, 0, 0), lowest(major.saturating_add(1), 0, 0))
    } else if p.is_x_patch() {
        let upper = if major == 0 {
            lowest(0, minor.saturating_add(1), 0)
        } else {
            lowest(major.saturating_add(1), 0, 0)
        };
        bounded(release(major, minor, 0), upper)
    } else {
        let upper = match (major, minor) {
            (0, 0) => lowest(0, 0, patch.saturating_add(1)),
            (0, _) => lowest(0, minor.saturating_add(1), 0),
            _ => lowest(major.saturating_add(1), 0, 0),
        };
        bounded(p.full(), upper)
    }
}

/// `~1.2.3` := `>=1.2.3 <1.3.0-0`, `~1` := `>=1.0.0 <2.0.0-0`
fn desugar_tilde(p: &PartialVersion) -> Vec<Comparator> {
    let (major, minor) = (p.major(), p.minor());

    if p.is_x_major() {
        Vec::new()
    } else if p.is_x_minor() {
        bounded(release(major, 0, 0), lowest(major.saturating_add(1), 0, 0))
    } else if p.is_x_patch() {
        bounded(release(major, minor, 0), lowest(major, minor.saturating_add(1), 0))
    } else {
        bounded(p.full(), lowest(major, minor.saturating_add(1), 0))
    }
}

/// Primitive comparators and X-ranges (`1.2` := `>=1.2.0 <1.3.0-0`, `>1.2` := `>=1.3.0`)
fn desugar_primitive(op: Option<Op>, p: &PartialVersion) -> Vec<Comparator> {
    let (major, minor) = (p.major(), p.minor());

    if !p.is_x_patch() {
        return vec![Comparator::new(op.unwrap_or(Op::Eq), p.full())];
    }

    let op = op.filter(|op| *op != Op::Eq);

    if p.is_x_major() {
        return match op {
            Some(Op::Gt) | Some(Op::Lt) => nothing(),
            _ => Vec::new(),
        };
    }

    match op {
        Some(Op::Gt) => {
            let lower = if p.is_x_minor() {
                release(major.saturating_add(1), 0, 0)
            } else {
                release(major, minor.saturating_add(1), 0)
            };
            vec![Comparator::new(Op::Gte, lower)]
        }
        Some(Op::Lte) => {
            let upper = if p.is_x_minor() {
                lowest(major.saturating_add(1), 0, 0)
            } else {
                lowest(major, minor.saturating_add(1), 0)
            };
            vec![Comparator::new(Op::Lt, upper)]
        }
        Some(Op::Lt) => vec![Comparator::new(Op::Lt, lowest(major, minor, 0))],
        Some(Op::Gte) => vec![Comparator::new(Op::Gte, release(major, minor, 0))],
        _ if p.is_x_minor() => {
            bounded(release(major, 0, 0), lowest(major.saturating_add(1), 0, 0))
        }
        _ => bounded(release(major, minor, 0), lowest(major, minor.saturating_add(1), 0)),
    }
}

/// `1.2 - 2.3.4` := `>=1.2.0 <=2.3.4`, `1.2.3 - 2` := `>=1.2.3 <3.0.0-0`
fn desugar_hyphen(from: &PartialVersion, to: &PartialVersion) -> Vec<Comparator> {
    let mut comparators = Vec::new();

    if !from.is_x_major() {
        let lower = if from.is_x_minor() {
            release(from.major(), 0, 0)
        } else if from.is_x_patch() {
            release(from.major(), from.minor(), 0)
        } else {
            from.full()
        };
        comparators.push(Comparator::new(Op::Gte, lower));
    }

    if !to.is_x_major() {
        let upper = if to.is_x_minor() {
            Comparator::new(Op::Lt, lowest(to.major().saturating_add(1), 0, 0))
        } else if to.is_x_patch() {
            Comparator::new(Op::Lt, lowest(to.major(), to.minor().saturating_add(1), 0))
        } else {
            Comparator::new(Op::Lte, to.full())
        };
        comparators.push(upper);
    }

    comparators
}
