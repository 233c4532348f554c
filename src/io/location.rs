use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::error::ResolveError;

/// Where a STAC item document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// `s3://bucket/key`
    S3 { bucket: String, key: String },

    /// `http://...` or `https://...`
    Http(String),

    /// Local filesystem path (plain path or `file://` URL)
    Local(PathBuf),
}

impl Location {
    /// Classify a locator by its scheme.
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ResolveError::MissingUrl);
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(raw).map_err(|e| invalid(raw, e.to_string()))?;
            return Ok(Location::Http(url.to_string()));
        }

        if lower.starts_with("s3://") {
            let url = Url::parse(raw).map_err(|e| invalid(raw, e.to_string()))?;
            let bucket = url
                .host_str()
                .filter(|b| !b.is_empty())
                .ok_or_else(|| invalid(raw, "missing bucket"))?
                .to_string();
            let key = url.path().trim_start_matches('/');
            if key.is_empty() {
                return Err(invalid(raw, "missing object key"));
            }
            let key = urlencoding::decode(key)
                .map_err(|e| invalid(raw, e.to_string()))?
                .into_owned();
            return Ok(Location::S3 { bucket, key });
        }

        if lower.starts_with("file://") {
            let url = Url::parse(raw).map_err(|e| invalid(raw, e.to_string()))?;
            let path = url
                .to_file_path()
                .map_err(|_| invalid(raw, "not a valid file path"))?;
            return Ok(Location::Local(path));
        }

        if let Some((scheme, _)) = raw.split_once("://") {
            return Err(invalid(raw, format!("unsupported scheme '{}'", scheme)));
        }

        Ok(Location::Local(PathBuf::from(raw)))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::S3 { bucket, key } => write!(f, "s3://{}/{}", bucket, key),
            Location::Http(url) => f.write_str(url),
            Location::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

fn invalid(url: &str, reason: impl Into<String>) -> ResolveError {
    ResolveError::InvalidUrl {
        url: url.to_string(),
        reason: reason.into(),
    }
}
