//! Shared HTTP handlers and error mapping.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check endpoint
//!
//! Tiler endpoints live in [`crate::factory`] and [`crate::stac`]; they all
//! report failures through the [`IntoResponse`] implementation of
//! [`TilerError`] below.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{IoError, ReaderError, ResolveError, TilerError};

// =============================================================================
// Response Types
// =============================================================================

/// Body of every error response: `{"error": "...", "message": "...", "status": 400}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable identifier of the failure class, e.g. `invalid_asset`
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status.as_u16());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// =============================================================================
// Error Mapping
// =============================================================================

fn io_status(err: &IoError) -> (StatusCode, &'static str) {
    match err {
        IoError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        IoError::Connection(_) => (StatusCode::BAD_GATEWAY, "connection_error"),
        IoError::S3(_) | IoError::Http(_) | IoError::Local(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "storage_error")
        }
    }
}

impl TilerError {
    /// HTTP status and error type identifier for this error.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            TilerError::Resolve(ResolveError::MissingUrl)
            | TilerError::Resolve(ResolveError::InvalidUrl { .. }) => {
                (StatusCode::NOT_FOUND, "not_found")
            }

            TilerError::Reader(reader_err) => match reader_err {
                ReaderError::Io(io_err) => io_status(io_err),
                ReaderError::InvalidItem(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_item"),
                ReaderError::MissingAssets => (StatusCode::BAD_REQUEST, "missing_assets"),
                ReaderError::InvalidAsset { .. } => (StatusCode::BAD_REQUEST, "invalid_asset"),
                ReaderError::InvalidBandIndex { .. } => {
                    (StatusCode::BAD_REQUEST, "invalid_band_index")
                }
                ReaderError::Unsupported { .. } => (StatusCode::NOT_IMPLEMENTED, "not_implemented"),
                ReaderError::Backend(_) => (StatusCode::INTERNAL_SERVER_ERROR, "reader_error"),
            },

            TilerError::InvalidParameter { .. } => (StatusCode::BAD_REQUEST, "invalid_parameter"),
        }
    }
}

/// 5xx failures are logged as errors, unknown datasets at debug level and
/// rejected requests as warnings.
impl IntoResponse for TilerError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status();
        let message = self.to_string();
        let code = status.as_u16();

        match status {
            s if s.is_server_error() => error!(error_type, status = code, "{}", message),
            StatusCode::NOT_FOUND => debug!(error_type, status = code, "{}", message),
            _ => warn!(error_type, status = code, "{}", message),
        }

        let body = ErrorResponse::new(error_type, message).with_status(status);
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /health`: liveness check reporting the crate version.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
