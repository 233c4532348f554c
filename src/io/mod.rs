//! I/O layer for fetching STAC item documents.
//!
//! Items are addressed by a [`Location`]: an `s3://` object, an `http(s)://`
//! URL or a local path. [`ItemFetcher`] dispatches to the matching backend.

mod http;
mod local;
mod location;
mod s3;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::IoError;

pub use self::http::HttpFetcher;
pub use local::LocalFetcher;
pub use location::Location;
pub use s3::{create_s3_client, S3Fetcher};

/// Source of raw item documents.
#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn fetch(&self, location: &Location) -> Result<Bytes, IoError>;
}

/// Fetches items from S3 (if configured), HTTP(S) and the local filesystem.
#[derive(Clone, Default)]
pub struct ItemFetcher {
    s3: Option<S3Fetcher>,
    http: HttpFetcher,
    local: LocalFetcher,
}

impl ItemFetcher {
    /// A fetcher without S3 support.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable `s3://` locations.
    pub fn with_s3(mut self, client: aws_sdk_s3::Client) -> Self {
        self.s3 = Some(S3Fetcher::new(client));
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = HttpFetcher::new(client);
        self
    }

    pub fn supports_s3(&self) -> bool {
        self.s3.is_some()
    }
}

#[async_trait]
impl ItemSource for ItemFetcher {
    async fn fetch(&self, location: &Location) -> Result<Bytes, IoError> {
        match location {
            Location::S3 { bucket, key } => match self.s3 {
                Some(ref s3) => s3.get_object(bucket, key).await,
                None => Err(IoError::S3(format!(
                    "cannot read {}: S3 access is not configured",
                    location
                ))),
            },
            Location::Http(url) => self.http.get(url).await,
            Location::Local(path) => self.local.read(path).await,
        }
    }
}
