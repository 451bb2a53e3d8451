//! Julia `[compat]` entry translation
//!
//! Julia compat entries use their own syntax: comma separated clauses (OR),
//! a bare version means caret, `≥`/`≤` are allowed and there is no AND.
//! Each clause is rewritten into the npm range grammar understood by
//! [`VersionRange`].

use std::sync::LazyLock;

use regex::Regex;

use crate::version::range::VersionRange;

static OPERATOR_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(>=|>|<) (\d)").expect("operator pattern is a valid regex"));

/// Translate a Julia compat entry into a version range.
///
/// Returns None when any clause is unusable.
pub fn translate_compat_range(raw: &str) -> Option<VersionRange> {
    let clauses = raw
        .split(',')
        .map(translate_clause)
        .collect::<Option<Vec<_>>>()?;

    VersionRange::parse(&clauses.join(" || ")).ok()
}

fn translate_clause(clause: &str) -> Option<String> {
    let clause = clause.trim();
    if clause.is_empty() {
        return None;
    }

    let clause = clause.replace('≥', ">=").replace('≤', "<=");
    let clause = clause.split_whitespace().collect::<Vec<_>>().join(" ");
    let clause = OPERATOR_SPACE_RE.replace_all(&clause, "${1}${2}").into_owned();

    if VersionRange::parse(&clause).is_err()
        || has_implicit_and(&clause)
        || clause.starts_with("<=")
        || clause == "*"
    {
        return None;
    }

    if clause.starts_with(|c: char| c.is_ascii_digit()) && !clause.contains(' ') {
        Some(format!("^{clause}"))
    } else {
        Some(clause)
    }
}

/// True when whitespace joins several comparators. A hyphen range `A - B`
/// is the only multi-word form allowed.
fn has_implicit_and(clause: &str) -> bool {
    let words: Vec<&str> = clause.split(' ').collect();
    match words.as_slice() {
        [_] => false,
        [_, "-", _] => false,
        _ => true,
    }
}
