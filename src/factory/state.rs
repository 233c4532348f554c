//! Shared state handed to every endpoint handler of a tiler.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use axum::Json;
use http::Uri;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ReaderError, TilerError};
use crate::params::{ExtraParams, LayerParamsKind};
use crate::reader::{ReaderArgs, ReaderOptions, ReaderScope, ReaderType};

use super::endpoints::{EndpointName, ResponseModel};
use super::path::{DatasetRef, PathResolver};

/// Cheaply cloneable handler state.
///
/// Built by [`TilerFactory::state`](super::TilerFactory::state) from the
/// factory configuration and the final endpoint table, so handlers see the
/// paths and response models actually registered.
#[derive(Clone)]
pub struct TilerState {
    inner: Arc<StateInner>,
}

struct StateInner {
    reader: Arc<dyn ReaderType>,
    reader_options: ReaderOptions,
    path_resolver: Arc<dyn PathResolver>,
    extra_params: Arc<dyn ExtraParams>,
    layer_params: LayerParamsKind,
    prefix: String,
    cache_max_age: u32,
    paths: BTreeMap<EndpointName, &'static str>,
    models: BTreeMap<EndpointName, ResponseModel>,
}

impl TilerState {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        reader: Arc<dyn ReaderType>,
        reader_options: ReaderOptions,
        path_resolver: Arc<dyn PathResolver>,
        extra_params: Arc<dyn ExtraParams>,
        layer_params: LayerParamsKind,
        prefix: String,
        cache_max_age: u32,
        paths: BTreeMap<EndpointName, &'static str>,
        models: BTreeMap<EndpointName, ResponseModel>,
    ) -> Self {
        Self {
            inner: Arc::new(StateInner {
                reader,
                reader_options,
                path_resolver,
                extra_params,
                layer_params,
                prefix,
                cache_max_age,
                paths,
                models,
            }),
        }
    }

    /// Resolve the dataset reference of a request.
    pub fn resolve(&self, uri: &Uri) -> Result<DatasetRef, TilerError> {
        Ok(self.inner.path_resolver.resolve(uri)?)
    }

    /// Open a request-scoped reader, preferring the dataset's own reader.
    pub async fn open(&self, dataset: &DatasetRef) -> Result<ReaderScope, TilerError> {
        let reader_type = dataset.reader.as_ref().unwrap_or(&self.inner.reader);
        let scope =
            ReaderScope::open(reader_type.as_ref(), &dataset.url, &self.inner.reader_options)
                .await?;
        Ok(scope)
    }

    /// Arguments from the tiler's layer parameter bundle.
    pub fn layer_args(&self, uri: &Uri) -> ReaderArgs {
        self.inner.layer_params.extract(uri)
    }

    /// Arguments contributed by the extra-parameter collaborator.
    pub fn extra_args(&self, uri: &Uri) -> ReaderArgs {
        self.inner.extra_params.extract(uri)
    }

    pub fn reader_options(&self) -> &ReaderOptions {
        &self.inner.reader_options
    }

    pub fn cache_max_age(&self) -> u32 {
        self.inner.cache_max_age
    }

    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    pub fn response_model(&self, name: EndpointName) -> ResponseModel {
        self.inner
            .models
            .get(&name)
            .copied()
            .unwrap_or(ResponseModel::PASSTHROUGH)
    }

    /// Serialize a body and apply the endpoint's response model.
    pub fn shape<T: Serialize>(&self, name: EndpointName, body: &T) -> Result<Json<Value>, TilerError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ReaderError::Backend(format!("cannot serialize {} response: {}", name, e)))?;
        Ok(Json(self.response_model(name).apply(value)))
    }

    /// Path of a registered endpoint including the router prefix.
    pub fn path_for(&self, name: EndpointName) -> Option<String> {
        let path = self.inner.paths.get(&name)?;
        if self.inner.prefix.is_empty() {
            Some(path.to_string())
        } else {
            Some(format!("/{}{}", self.inner.prefix, path))
        }
    }

    /// Absolute URL of a registered endpoint as seen by the client.
    pub fn url_for(&self, headers: &HeaderMap, name: EndpointName) -> Option<String> {
        let url = format!("{}{}", base_url(headers), self.path_for(name)?);
        debug!(endpoint = %name, url = %url, "Resolved endpoint URL");
        Some(url)
    }
}

/// Scheme and host of the incoming request.
///
/// Honours `X-Forwarded-Proto` for deployments behind a reverse proxy.
pub fn base_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8000");

    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");

    format!("{}://{}", proto, host)
}
