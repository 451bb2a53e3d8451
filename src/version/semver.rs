use std::cmp::Ordering;
use std::collections::HashSet;

use semver::Version;

/// Parse a catalogue entry into a semver::Version.
///
/// Accepts an optional leading `v` (e.g. "v1.0.5"). Returns None for
/// anything that is not a complete semantic version.
pub fn parse_release(version: &str) -> Option<Version> {
    let trimmed = version.trim();
    let unprefixed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(unprefixed).ok()
}

/// Sort version strings, comparing runs of digits numerically.
///
/// Unlike a lexicographic sort "4.5.0" comes before "4.21.0". Works on any
/// string, so nightly specifiers can be sorted alongside releases.
pub fn version_sort(mut versions: Vec<String>) -> Vec<String> {
    versions.sort_by(|a, b| natural_cmp(a, b));
    versions
}

/// Deduplicate while keeping the first occurrence of every value
pub fn unique<T: Clone + Eq + std::hash::Hash>(values: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|value| seen.insert(*value))
        .cloned()
        .collect()
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars().peekable();
    let mut b_chars = b.chars().peekable();

    loop {
        match (a_chars.peek().copied(), b_chars.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let x_run = take_digits(&mut a_chars);
                let y_run = take_digits(&mut b_chars);
                let ordering = cmp_digit_runs(&x_run, &y_run);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                a_chars.next();
                b_chars.next();
                if x != y {
                    return x.cmp(&y);
                }
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

/// Compare two digit runs by numeric value without overflowing
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        .then_with(|| a.len().cmp(&b.len()))
}
