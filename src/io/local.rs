use std::io::ErrorKind;
use std::path::Path;

use bytes::Bytes;

use crate::error::IoError;

/// Reads documents from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFetcher;

impl LocalFetcher {
    pub async fn read(&self, path: &Path) -> Result<Bytes, IoError> {
        match tokio::fs::read(path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(IoError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(IoError::Local(format!("{}: {}", path.display(), e))),
        }
    }
}
