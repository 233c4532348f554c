//! Configuration management for the STAC tiler.
//!
//! Every setting is a command-line flag with a `STAC_` environment variable
//! fallback. Only the item source settings (S3 endpoint and region) and the
//! asset filters change what the tiler serves; the rest shape the HTTP layer.
//!
//! # Example
//!
//! ```ignore
//! use stac_tiler::config::Config;
//!
//! let config = Config::parse();
//! println!("Listening on {}", config.bind_address());
//! ```
//!
//! # Environment Variables
//!
//! - `STAC_HOST` - Server bind address (default: 0.0.0.0)
//! - `STAC_PORT` - Server port (default: 8000)
//! - `STAC_PREFIX` - Path prefix of the tiler routes (default: stac)
//! - `STAC_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `STAC_S3_REGION` - AWS region (default: us-east-1)
//! - `STAC_CACHE_ITEMS` - Max parsed STAC items to cache (default: 100)
//! - `STAC_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `STAC_MINZOOM` / `STAC_MAXZOOM` - Zoom range advertised (default: 0-24)
//! - `STAC_INCLUDE_ASSET_TYPES` - Media types of exposed assets (comma-separated)
//! - `STAC_EXCLUDE_ASSETS` - Asset names never exposed (comma-separated)
//! - `STAC_CORS_ORIGINS` - Allowed CORS origins (comma-separated)
//! - `STAC_VIEWER_TEMPLATE` - HTML template for the viewer page

use std::path::PathBuf;

use clap::Parser;

use crate::factory::DEFAULT_CACHE_MAX_AGE;
use crate::reader::{ReaderOptions, DEFAULT_MAXZOOM, DEFAULT_MINZOOM};
use crate::stac::{DEFAULT_ITEM_CACHE_CAPACITY, DEFAULT_PREFIX};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Highest zoom level accepted in the configuration.
pub const MAX_ZOOM: u8 = 30;

// =============================================================================
// CLI Arguments
// =============================================================================

/// STAC Tiler - dynamic tiles and metadata for multi-asset STAC items.
///
/// Serves asset listings, per asset info and band statistics for STAC items
/// stored in S3, behind HTTP(S) or on the local filesystem.
#[derive(Parser, Debug, Clone)]
#[command(name = "stac-tiler")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Interface to listen on.
    #[arg(long, default_value = DEFAULT_HOST, env = "STAC_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "STAC_PORT")]
    pub port: u16,

    /// Path prefix of the tiler routes (empty to mount at the root).
    #[arg(long, default_value = DEFAULT_PREFIX, env = "STAC_PREFIX")]
    pub prefix: String,

    // =========================================================================
    // S3 Configuration
    // =========================================================================
    /// S3-compatible endpoint used for `s3://` item URLs (MinIO, etc.).
    ///
    /// Defaults to AWS.
    #[arg(long, env = "STAC_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "STAC_S3_REGION")]
    pub s3_region: String,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Maximum number of parsed STAC items to keep in cache.
    #[arg(long, default_value_t = DEFAULT_ITEM_CACHE_CAPACITY, env = "STAC_CACHE_ITEMS")]
    pub cache_items: usize,

    /// `Cache-Control: max-age` of tile responses.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "STAC_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // Reader Configuration
    // =========================================================================
    /// Minimum zoom level advertised for datasets.
    #[arg(long, default_value_t = DEFAULT_MINZOOM, env = "STAC_MINZOOM")]
    pub minzoom: u8,

    /// Maximum zoom level advertised for datasets.
    #[arg(long, default_value_t = DEFAULT_MAXZOOM, env = "STAC_MAXZOOM")]
    pub maxzoom: u8,

    /// Media types of exposed assets (comma-separated).
    ///
    /// If not specified, GeoTIFF and COG assets are exposed.
    #[arg(long, env = "STAC_INCLUDE_ASSET_TYPES", value_delimiter = ',')]
    pub include_asset_types: Option<Vec<String>>,

    /// Asset names that are never exposed (comma-separated).
    #[arg(long, env = "STAC_EXCLUDE_ASSETS", value_delimiter = ',')]
    pub exclude_assets: Option<Vec<String>>,

    // =========================================================================
    // HTTP Configuration
    // =========================================================================
    /// Origins allowed to read cross-origin (comma-separated).
    ///
    /// Any origin when unset; an empty value disables CORS.
    #[arg(long, env = "STAC_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// HTML template for the viewer page.
    ///
    /// `{{tilejson}}` and `{{info}}` are replaced with the endpoint URLs.
    #[arg(long, env = "STAC_VIEWER_TEMPLATE")]
    pub viewer_template: Option<PathBuf>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Log at debug level.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Skip the per-request `TraceLayer`.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Check settings clap cannot express, returning a readable message.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_items == 0 {
            return Err("cache_items must be greater than 0".to_string());
        }

        if self.maxzoom > MAX_ZOOM {
            return Err(format!("maxzoom must be at most {}", MAX_ZOOM));
        }
        if self.minzoom > self.maxzoom {
            return Err(format!(
                "minzoom ({}) must not be greater than maxzoom ({})",
                self.minzoom, self.maxzoom
            ));
        }

        let prefix = self.normalized_prefix();
        if prefix.contains("//") || prefix.contains(char::is_whitespace) {
            return Err(format!("Invalid route prefix: {:?}", self.prefix));
        }

        if let Some(ref types) = self.include_asset_types {
            if types.iter().all(|t| t.trim().is_empty()) {
                return Err("include_asset_types must list at least one media type".to_string());
            }
        }

        if let Some(ref path) = self.viewer_template {
            if !path.is_file() {
                return Err(format!("Viewer template not found: {}", path.display()));
            }
        }

        Ok(())
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Route prefix without leading or trailing slashes.
    pub fn normalized_prefix(&self) -> &str {
        self.prefix.trim_matches('/')
    }

    /// Reader options derived from the asset and zoom settings.
    pub fn reader_options(&self) -> ReaderOptions {
        let mut options = ReaderOptions::default().with_zoom_range(self.minzoom, self.maxzoom);

        if let Some(ref types) = self.include_asset_types {
            let types = trimmed(types);
            if !types.is_empty() {
                options = options.with_include_asset_types(types);
            }
        }
        if let Some(ref assets) = self.exclude_assets {
            options = options.with_exclude_assets(trimmed(assets));
        }

        options
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
