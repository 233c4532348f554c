//! Dataset reference resolution.

use std::fmt;
use std::sync::Arc;

use http::Uri;

use crate::error::ResolveError;
use crate::io::Location;
use crate::params::QueryValues;
use crate::reader::ReaderType;

/// A resolved dataset locator, valid for one request.
#[derive(Clone)]
pub struct DatasetRef {
    pub url: String,

    /// Reader to use instead of the tiler's default, if any
    pub reader: Option<Arc<dyn ReaderType>>,
}

impl DatasetRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reader: None,
        }
    }

    pub fn with_reader(mut self, reader: Arc<dyn ReaderType>) -> Self {
        self.reader = Some(reader);
        self
    }
}

impl fmt::Debug for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetRef")
            .field("url", &self.url)
            .field("reader", &self.reader.as_ref().map(|r| r.name().to_string()))
            .finish()
    }
}

/// Turns an incoming request into a dataset reference.
pub trait PathResolver: Send + Sync {
    fn resolve(&self, uri: &Uri) -> Result<DatasetRef, ResolveError>;
}

/// Reads the dataset locator from the `url` query parameter.
///
/// Locators starting with a registered prefix (e.g. `s3://`) are opened with
/// the reader registered for that prefix; the first matching prefix wins.
#[derive(Default, Clone)]
pub struct UrlPathResolver {
    overrides: Vec<(String, Arc<dyn ReaderType>)>,
}

impl UrlPathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, prefix: impl Into<String>, reader: Arc<dyn ReaderType>) -> Self {
        self.overrides.push((prefix.into().to_ascii_lowercase(), reader));
        self
    }
}

impl PathResolver for UrlPathResolver {
    fn resolve(&self, uri: &Uri) -> Result<DatasetRef, ResolveError> {
        let url = match QueryValues::from_uri(uri).owned("url") {
            Some(url) if !url.trim().is_empty() => url,
            _ => return Err(ResolveError::MissingUrl),
        };

        // Reject locators no fetcher could handle before a reader is opened
        Location::parse(&url)?;

        let lowered = url.to_ascii_lowercase();
        let reader = self
            .overrides
            .iter()
            .find(|(prefix, _)| lowered.starts_with(prefix.as_str()))
            .map(|(_, reader)| Arc::clone(reader));

        Ok(DatasetRef { url, reader })
    }
}
