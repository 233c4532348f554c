//! Test utilities for integration tests.
//!
//! This module provides a fake reader that records every call it receives,
//! plus helpers for sending requests and decoding responses.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use stac_tiler::reader::{
    DatasetReader, ImageStatistics, Info, Metadata, NodataType, OrderedMap, PreviewRequest,
    ReaderArgs, ReaderOptions, ReaderType, TileRequest,
};
use stac_tiler::ReaderError;

/// Item URL accepted by the default path resolver.
pub const ITEM_URL: &str = "https://example.com/item.json";

/// Bounds reported by the fake reader.
pub const BOUNDS: [f64; 4] = [-10.0, -20.0, 10.0, 20.0];

// =============================================================================
// Call Tracking
// =============================================================================

/// Everything the fake reader has seen, shared between clones.
#[derive(Default)]
pub struct CallLog {
    opens: AtomicUsize,
    closes: AtomicUsize,
    urls: Mutex<Vec<String>>,
    args: Mutex<Vec<ReaderArgs>>,
    percentiles: Mutex<Vec<(f64, f64)>>,
    tiles: Mutex<Vec<TileRequest>>,
    previews: Mutex<Vec<PreviewRequest>>,
}

impl CallLog {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    /// Arguments of the most recent reader call.
    pub fn last_args(&self) -> Option<ReaderArgs> {
        self.args.lock().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.args.lock().unwrap().len()
    }

    pub fn last_percentiles(&self) -> Option<(f64, f64)> {
        self.percentiles.lock().unwrap().last().copied()
    }

    pub fn last_tile(&self) -> Option<TileRequest> {
        self.tiles.lock().unwrap().last().copied()
    }

    pub fn last_preview(&self) -> Option<PreviewRequest> {
        self.previews.lock().unwrap().last().copied()
    }

    fn record(&self, args: &ReaderArgs) {
        self.args.lock().unwrap().push(args.clone());
    }
}

// =============================================================================
// Fake Reader
// =============================================================================

/// A reader type serving a fixed set of single band assets.
#[derive(Clone)]
pub struct FakeReaderType {
    name: String,
    assets: Vec<String>,
    log: Arc<CallLog>,
}

impl FakeReaderType {
    pub fn new(assets: &[&str]) -> Self {
        Self {
            name: "fake".to_string(),
            assets: assets.iter().map(|a| a.to_string()).collect(),
            log: Arc::new(CallLog::default()),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn log(&self) -> Arc<CallLog> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl ReaderType for FakeReaderType {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open(
        &self,
        url: &str,
        options: &ReaderOptions,
    ) -> Result<Box<dyn DatasetReader>, ReaderError> {
        self.log.opens.fetch_add(1, Ordering::SeqCst);
        self.log.urls.lock().unwrap().push(url.to_string());

        Ok(Box::new(FakeReader {
            assets: self.assets.clone(),
            minzoom: options.minzoom,
            maxzoom: options.maxzoom,
            log: Arc::clone(&self.log),
        }))
    }
}

pub struct FakeReader {
    assets: Vec<String>,
    minzoom: u8,
    maxzoom: u8,
    log: Arc<CallLog>,
}

impl FakeReader {
    fn selected(&self, args: &ReaderArgs) -> Result<Vec<String>, ReaderError> {
        let selected = match args.assets() {
            Some(assets) if !assets.is_empty() => assets.to_vec(),
            _ => return Err(ReaderError::MissingAssets),
        };
        for name in &selected {
            if !self.assets.contains(name) {
                return Err(ReaderError::InvalidAsset {
                    asset: name.clone(),
                    available: self.assets.join(", "),
                });
            }
        }
        Ok(selected)
    }

    fn info_record(&self) -> Info {
        Info {
            bounds: BOUNDS,
            center: (0.0, 0.0, self.minzoom),
            minzoom: self.minzoom,
            maxzoom: self.maxzoom,
            band_metadata: vec![("1".to_string(), BTreeMap::new())],
            band_descriptions: vec![("1".to_string(), String::new())],
            dtype: "uint16".to_string(),
            nodata_type: NodataType::None,
            colorinterp: None,
            scale: None,
            offset: None,
            width: Some(256),
            height: Some(256),
            count: Some(1),
        }
    }
}

#[async_trait]
impl DatasetReader for FakeReader {
    fn assets(&self) -> Vec<String> {
        self.assets.clone()
    }

    fn bounds(&self) -> [f64; 4] {
        BOUNDS
    }

    fn minzoom(&self) -> u8 {
        self.minzoom
    }

    fn maxzoom(&self) -> u8 {
        self.maxzoom
    }

    async fn info(&self, args: &ReaderArgs) -> Result<OrderedMap<Info>, ReaderError> {
        self.log.record(args);
        let selected = self.selected(args)?;
        Ok(selected
            .into_iter()
            .map(|name| (name, self.info_record()))
            .collect())
    }

    async fn metadata(
        &self,
        pmin: f64,
        pmax: f64,
        args: &ReaderArgs,
    ) -> Result<OrderedMap<Metadata>, ReaderError> {
        self.log.record(args);
        self.log.percentiles.lock().unwrap().push((pmin, pmax));

        let selected = match args.assets() {
            Some(assets) if !assets.is_empty() => self.selected(args)?,
            _ => self.assets.clone(),
        };

        let mut statistics = OrderedMap::new();
        statistics.insert(
            "1".to_string(),
            ImageStatistics {
                percentiles: vec![pmin, pmax],
                min: 0.0,
                max: 100.0,
                std: None,
                mean: Some(50.0),
                histogram: None,
            },
        );

        Ok(selected
            .into_iter()
            .map(|name| {
                let metadata = Metadata {
                    info: self.info_record(),
                    statistics: statistics.clone(),
                };
                (name, metadata)
            })
            .collect())
    }

    async fn tile(&self, request: &TileRequest, args: &ReaderArgs) -> Result<Bytes, ReaderError> {
        self.log.record(args);
        self.log.tiles.lock().unwrap().push(*request);
        Ok(Bytes::from_static(b"tile"))
    }

    async fn preview(
        &self,
        request: &PreviewRequest,
        args: &ReaderArgs,
    ) -> Result<Bytes, ReaderError> {
        self.log.record(args);
        self.log.previews.lock().unwrap().push(*request);
        Ok(Bytes::from_static(b"preview"))
    }

    fn close(&mut self) {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Send a GET request through the router.
pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router.clone().oneshot(request).await.unwrap()
}

/// Send a GET request with a Host header.
pub async fn get_with_host(router: &Router, uri: &str, host: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("host", host)
        .body(Body::empty())
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = body_bytes(response).await;
    serde_json::from_slice(&body).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let body = body_bytes(response).await;
    String::from_utf8(body.to_vec()).unwrap()
}

/// GET `uri`, assert the status and decode the JSON body.
pub async fn get_json(router: &Router, uri: &str, status: StatusCode) -> Value {
    let response = get(router, uri).await;
    assert_eq!(response.status(), status, "unexpected status for {}", uri);
    body_json(response).await
}

/// Percent-encode a value for use in a query string.
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
