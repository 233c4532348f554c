//! Request-scoped reader lifetime.

use std::fmt;
use std::ops::Deref;

use tracing::debug;

use crate::error::ReaderError;

use super::{DatasetReader, ReaderOptions, ReaderType};

/// A reader opened for the duration of one request.
///
/// The reader is closed when the scope is dropped: after a successful
/// response, on an early return, when an error is propagated with `?`, and
/// when the request future is cancelled. Dropping happens once, so the
/// reader is closed exactly once.
pub struct ReaderScope {
    reader: Box<dyn DatasetReader>,
    url: String,
}

impl ReaderScope {
    /// Open `url` with the given reader implementation.
    pub async fn open(
        reader_type: &dyn ReaderType,
        url: &str,
        options: &ReaderOptions,
    ) -> Result<Self, ReaderError> {
        let reader = reader_type.open(url, options).await?;
        debug!(url = url, reader = reader_type.name(), "Opened reader");

        Ok(Self {
            reader,
            url: url.to_string(),
        })
    }

    /// The locator this reader was opened against.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Deref for ReaderScope {
    type Target = dyn DatasetReader;

    fn deref(&self) -> &Self::Target {
        self.reader.as_ref()
    }
}

impl Drop for ReaderScope {
    fn drop(&mut self) {
        self.reader.close();
        debug!(url = %self.url, "Closed reader");
    }
}

impl fmt::Debug for ReaderScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderScope").field("url", &self.url).finish()
    }
}
