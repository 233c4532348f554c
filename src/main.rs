//! STAC Tiler - dynamic tiles and metadata for multi-asset STAC items.
//!
//! This binary starts the HTTP server and configures all components.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stac_tiler::{
    config::Config,
    create_s3_client,
    io::ItemFetcher,
    server::{create_router, RouterConfig, ViewerPage},
    stac::{ItemCache, StacReaderType, StacTiler},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("STAC Tiler v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    if let Some(ref endpoint) = config.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  S3 region: {}", config.s3_region);
    info!("  Zoom range: {}-{}", config.minzoom, config.maxzoom);

    // Item sources: S3, HTTP(S) and local files
    let s3_client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;
    let fetcher = ItemFetcher::new().with_s3(s3_client);

    let cache = Arc::new(ItemCache::new(config.cache_items));
    info!("  Cache: {} items", cache.capacity());
    let reader_type = StacReaderType::new(fetcher).with_cache(cache);

    let mut tiler = StacTiler::new(reader_type).with_reader_options(config.reader_options());

    if let Some(ref path) = config.viewer_template {
        match ViewerPage::from_file(path) {
            Ok(page) => {
                info!("  Viewer template: {}", path.display());
                tiler = tiler.with_viewer(page);
            }
            Err(e) => {
                error!("Failed to read viewer template {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        }
    }

    let router_config = build_router_config(&config);
    let router = create_router(tiler, router_config);

    // Bind and serve
    let addr = config.bind_address();
    let prefix = match config.normalized_prefix() {
        "" => String::new(),
        p => format!("/{}", p),
    };

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl 'http://{}{}/info?url=<item>'", addr, prefix);
    info!("    curl 'http://{}{}/info?url=<item>&assets=<name>'", addr, prefix);
    info!("    curl 'http://{}{}/metadata?url=<item>'", addr, prefix);
    info!("");
    info!("  View an item in your browser:");
    info!("    open 'http://{}{}/viewer?url=<item>'", addr, prefix);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "stac_tiler=debug,tower_http=debug"
    } else {
        "stac_tiler=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_prefix(config.normalized_prefix())
        .with_cache_max_age(config.cache_max_age);

    if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        router_config = router_config.with_cors_origins(origins);
    }

    router_config.with_tracing(!config.no_tracing)
}
