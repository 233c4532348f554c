//! Raw query parameter access.
//!
//! Parameter bundles read the query string through [`QueryValues`] rather
//! than a serde extractor, so a repeated parameter never rejects the request:
//! its last occurrence wins.

use std::collections::HashMap;

use http::Uri;

/// Decoded query parameters of a request, last occurrence of each name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryValues {
    values: HashMap<String, String>,
}

impl QueryValues {
    pub fn from_uri(uri: &Uri) -> Self {
        let values = match uri.query() {
            Some(query) => url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
            None => HashMap::new(),
        };
        Self { values }
    }

    /// Value of `name`; `Some("")` when given without a value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub(crate) fn owned(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}
