use bytes::Bytes;
use reqwest::{Client, StatusCode};

use crate::error::IoError;

/// Fetches documents over HTTP(S).
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, url: &str) -> Result<Bytes, IoError> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                IoError::Connection(e.to_string())
            } else {
                IoError::Http(e.to_string())
            }
        })?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Err(IoError::NotFound(url.to_string())),
            status if !status.is_success() => {
                return Err(IoError::Http(format!("{} returned {}", url, status)))
            }
            _ => {}
        }

        resp.bytes()
            .await
            .map_err(|e| IoError::Connection(e.to_string()))
    }
}
