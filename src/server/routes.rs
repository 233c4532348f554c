//! Router configuration for the STAC tiler.
//!
//! This module mounts the tiler routes under their prefix and applies CORS
//! and request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /health                                         - Health check
//! /{prefix}/tiles/{z}/{x}/{y}[@{scale}x][.{fmt}]  - Map tile
//! /{prefix}/tilejson.json                         - TileJSON document
//! /{prefix}/bounds                                - Dataset bounds
//! /{prefix}/info                                  - Asset list or per asset info
//! /{prefix}/metadata                              - Per asset statistics
//! /{prefix}/preview                               - Preview image
//! /{prefix}/viewer                                - Map viewer page
//! ```
//!
//! # Example
//!
//! ```ignore
//! use stac_tiler::io::ItemFetcher;
//! use stac_tiler::server::{create_router, RouterConfig};
//! use stac_tiler::stac::{StacReaderType, StacTiler};
//!
//! let tiler = StacTiler::new(StacReaderType::new(ItemFetcher::new()));
//! let config = RouterConfig::new()
//!     .with_prefix("stac")
//!     .with_cors_origins(vec!["https://maps.example.org".to_string()]);
//!
//! let router = create_router(tiler, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE, IF_NONE_MATCH};
use http::Method;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::handlers::health_handler;
use crate::factory::DEFAULT_CACHE_MAX_AGE;
use crate::stac::{StacTiler, DEFAULT_PREFIX};


// =============================================================================
// Router Configuration
// =============================================================================

/// Cross-origin policy of the router.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorsPolicy {
    /// Any origin may read tiles and documents.
    #[default]
    AnyOrigin,

    /// Only the listed origins are allowed.
    Origins(Vec<String>),

    /// No CORS headers are emitted.
    Disabled,
}

/// Settings applied when mounting the tiler into an application router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Path prefix of the tiler routes, without slashes (empty = root)
    pub prefix: String,

    pub cors: CorsPolicy,

    /// max-age of the `Cache-Control` header on tile responses
    pub cache_max_age: u32,

    /// Wrap the router in a `TraceLayer`
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Tiler routes under `/stac`, any CORS origin, one hour tile caching and
    /// request tracing.
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            cors: CorsPolicy::AnyOrigin,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            enable_tracing: true,
        }
    }

    /// Set the path prefix of the tiler routes.
    ///
    /// Leading and trailing slashes are ignored; an empty prefix mounts the
    /// routes at the root.
    pub fn with_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.prefix = prefix.as_ref().trim_matches('/').to_string();
        self
    }

    /// Restrict cross-origin reads to `origins`. An empty list disables CORS.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = if origins.is_empty() {
            CorsPolicy::Disabled
        } else {
            CorsPolicy::Origins(origins)
        };
        self
    }

    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = cors;
        self
    }

    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Mount the tiler under its prefix next to `/health`.
///
/// The router prefix and cache max-age of `config` are applied to the tiler,
/// so the URLs it generates (tilejson, viewer) match the mounted routes.
pub fn create_router(tiler: StacTiler, config: RouterConfig) -> Router {
    let tiler = tiler.configure(|factory| {
        factory
            .with_prefix(&config.prefix)
            .with_cache_max_age(config.cache_max_age)
    });

    let tiler_routes = tiler.router();
    let routes = if config.prefix.is_empty() {
        tiler_routes
    } else {
        Router::new().nest(&format!("/{}", config.prefix), tiler_routes)
    };

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .merge(routes);

    if let Some(cors) = cors_layer(&config.cors) {
        router = router.layer(cors);
    }

    if config.enable_tracing {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

/// All tiler routes are reads; preflights are cached for a day.
fn cors_layer(policy: &CorsPolicy) -> Option<CorsLayer> {
    let origin = match policy {
        CorsPolicy::Disabled => return None,
        CorsPolicy::AnyOrigin => AllowOrigin::any(),
        CorsPolicy::Origins(origins) => AllowOrigin::list(parse_origins(origins)),
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
            .allow_headers([ACCEPT, CONTENT_TYPE, IF_NONE_MATCH])
            .max_age(Duration::from_secs(24 * 60 * 60)),
    )
}

fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
