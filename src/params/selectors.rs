//! Parsers for the textual asset and band selectors.
//!
//! Both parsers are permissive: they never fail. A selector that was not
//! supplied parses to `None` so callers can leave the argument unset, which
//! is different from a selector supplied with an empty value.

use std::sync::LazyLock;

use regex::Regex;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit run pattern is valid"));

/// Three-state view of an optional query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    /// The parameter was not in the query string
    Absent,

    /// The parameter was given without a value (`?assets=`)
    Empty,

    /// The parameter was given with a value
    Value(&'a str),
}

impl<'a> Selector<'a> {
    pub fn from_raw(raw: Option<&'a str>) -> Self {
        match raw {
            None => Selector::Absent,
            Some("") => Selector::Empty,
            Some(value) => Selector::Value(value),
        }
    }
}

/// Split a comma-delimited asset selector.
///
/// Order and duplicates are preserved and tokens are not trimmed. Whether the
/// named assets exist is for the reader to decide. An empty selector yields
/// an empty list.
pub fn parse_asset_list(raw: Option<&str>) -> Option<Vec<String>> {
    match Selector::from_raw(raw) {
        Selector::Absent => None,
        Selector::Empty => Some(Vec::new()),
        Selector::Value(value) => Some(value.split(',').map(str::to_string).collect()),
    }
}

/// Extract every run of decimal digits from a band index selector.
///
/// Delimiters and any other character (including `-`) are ignored, so
/// `"1,2,05"`, `"1 2 5"` and `"[1;2;5]"` all give `[1, 2, 5]`. Runs too large
/// for a `u32` contribute nothing.
pub fn parse_band_index_list(raw: Option<&str>) -> Option<Vec<u32>> {
    let raw = raw?;
    Some(
        DIGIT_RUN
            .find_iter(raw)
            .filter_map(|m| m.as_str().parse::<u32>().ok())
            .collect(),
    )
}
