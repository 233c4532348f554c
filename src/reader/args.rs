//! Keyword-style arguments handed to reader operations.
//!
//! Parameter bundles, the metadata parameters and the additional-dependency
//! collaborator all produce a [`ReaderArgs`]. Handlers merge them in a fixed
//! order and pass the result to the reader, which looks up the keys it
//! understands. A key is present only if some source explicitly set it, and
//! keys keep the order in which they were first set.

use std::slice;

use serde::Serialize;

use super::ordered::OrderedMap;

/// Argument name for the ordered asset selection.
pub const ASSETS: &str = "assets";

/// Argument name for the 1-based band index selection.
pub const INDEXES: &str = "indexes";

/// Argument name for a band-math expression.
pub const EXPRESSION: &str = "expression";

/// A single argument value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Ordered list of names (e.g. assets)
    Strings(Vec<String>),

    /// Ordered list of band indexes
    Indexes(Vec<u32>),

    /// Ordered list of numbers (e.g. a histogram range)
    Numbers(Vec<f64>),

    /// Free text, passed through verbatim
    Text(String),

    /// Floating point scalar
    Number(f64),

    /// Integer scalar
    Integer(i64),

    /// Flag
    Bool(bool),
}

/// Mapping from argument name to value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReaderArgs {
    args: OrderedMap<ArgValue>,
}

impl ReaderArgs {
    /// Create an empty argument bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an argument, replacing any previous value for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) -> Option<ArgValue> {
        self.args.insert(name.into(), value)
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: ArgValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.args.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.args.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, (String, ArgValue)> {
        self.args.iter()
    }

    /// Merge `other` into `self`. Keys already present are overwritten in
    /// place.
    pub fn merge(&mut self, other: ReaderArgs) {
        self.args.extend(other.args);
    }

    /// Merge several sources left to right; the last write of a key wins.
    pub fn merged<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = ReaderArgs>,
    {
        let mut out = Self::new();
        for source in sources {
            out.merge(source);
        }
        out
    }

    /// The asset selection, if one was given.
    pub fn assets(&self) -> Option<&[String]> {
        match self.args.get(ASSETS) {
            Some(ArgValue::Strings(assets)) => Some(assets),
            _ => None,
        }
    }

    /// The band index selection, if one was given.
    pub fn indexes(&self) -> Option<&[u32]> {
        match self.args.get(INDEXES) {
            Some(ArgValue::Indexes(indexes)) => Some(indexes),
            _ => None,
        }
    }

    /// The band-math expression, if one was given.
    pub fn expression(&self) -> Option<&str> {
        self.text(EXPRESSION)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.args.get(name) {
            Some(ArgValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// A numeric argument; integers are widened.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.args.get(name) {
            Some(ArgValue::Number(n)) => Some(*n),
            Some(ArgValue::Integer(n)) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.args.get(name) {
            Some(ArgValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn numbers(&self, name: &str) -> Option<&[f64]> {
        match self.args.get(name) {
            Some(ArgValue::Numbers(values)) => Some(values),
            _ => None,
        }
    }
}

impl FromIterator<(String, ArgValue)> for ReaderArgs {
    fn from_iter<I: IntoIterator<Item = (String, ArgValue)>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ReaderArgs {
    type Item = &'a (String, ArgValue);
    type IntoIter = slice::Iter<'a, (String, ArgValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}
