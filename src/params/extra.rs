//! Additional reader arguments contributed by the integrator.

use http::Uri;

use crate::reader::{ArgValue, ReaderArgs};

/// Supplies extra keyword arguments for every reader call of a tiler.
///
/// These are merged last, so they override same-named arguments from the
/// parameter bundles.
pub trait ExtraParams: Send + Sync {
    fn extract(&self, uri: &Uri) -> ReaderArgs;
}

/// Contributes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtraParams;

impl ExtraParams for NoExtraParams {
    fn extract(&self, _uri: &Uri) -> ReaderArgs {
        ReaderArgs::new()
    }
}

/// Forwards the named query parameters verbatim as text arguments.
///
/// If a parameter is repeated, the last occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct PassthroughParams {
    names: Vec<String>,
}

impl PassthroughParams {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl ExtraParams for PassthroughParams {
    fn extract(&self, uri: &Uri) -> ReaderArgs {
        let mut args = ReaderArgs::new();
        let Some(query) = uri.query() else {
            return args;
        };

        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if self.names.iter().any(|n| *n == name) {
                args.insert(name.into_owned(), ArgValue::Text(value.into_owned()));
            }
        }
        args
    }
}
