//! HTTP server layer for the STAC tiler.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │              GET /health, /{prefix}/{endpoint}                  │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │   viewer    │  │        routes           │  │
//! │  │  (errors)   │  │ (HTML page) │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;
pub mod viewer;

pub use handlers::{health_handler, ErrorResponse, HealthResponse};
pub use routes::{create_router, CorsPolicy, RouterConfig};
pub use viewer::{viewer_handler, ViewerPage, ViewerState};
