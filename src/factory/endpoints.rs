//! The endpoint registration table.
//!
//! A tiler is described by one [`Registration`] per [`EndpointName`]. The base
//! factory fills every entry with its default implementation; a specialised
//! tiler swaps individual entries with [`EndpointTable::override_with`] and
//! inherits the rest untouched.

use std::collections::BTreeMap;
use std::fmt;

use axum::routing::MethodRouter;
use axum::Router;
use serde_json::{Map, Value};

use super::state::TilerState;

// =============================================================================
// Endpoint names
// =============================================================================

/// Endpoints every tiler registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EndpointName {
    Tile,
    TileJson,
    Bounds,
    Info,
    Metadata,
    Preview,
}

impl EndpointName {
    pub const ALL: [EndpointName; 6] = [
        EndpointName::Tile,
        EndpointName::TileJson,
        EndpointName::Bounds,
        EndpointName::Info,
        EndpointName::Metadata,
        EndpointName::Preview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointName::Tile => "tile",
            EndpointName::TileJson => "tilejson",
            EndpointName::Bounds => "bounds",
            EndpointName::Info => "info",
            EndpointName::Metadata => "metadata",
            EndpointName::Preview => "preview",
        }
    }
}

impl fmt::Display for EndpointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Response shaping
// =============================================================================

/// Output rules applied to an endpoint's JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseModel {
    /// Fields removed from each record
    pub exclude: &'static [&'static str],

    /// Drop `null` fields at any depth
    pub exclude_none: bool,

    /// Treat the body as a map of records (apply `exclude` to each value)
    /// instead of a single record
    pub per_record: bool,
}

impl ResponseModel {
    /// Serialize as-is.
    pub const PASSTHROUGH: ResponseModel = ResponseModel {
        exclude: &[],
        exclude_none: false,
        per_record: false,
    };

    /// Shape a serialized body.
    ///
    /// Arrays at the top level of a per-record body (e.g. a plain list of
    /// asset names) are returned unchanged apart from null removal.
    pub fn apply(&self, mut value: Value) -> Value {
        if !self.exclude.is_empty() {
            match (&mut value, self.per_record) {
                (Value::Object(records), true) => {
                    for record in records.values_mut() {
                        if let Value::Object(fields) = record {
                            self.exclude_fields(fields);
                        }
                    }
                }
                (Value::Object(fields), false) => self.exclude_fields(fields),
                _ => {}
            }
        }

        if self.exclude_none {
            strip_nulls(&mut value);
        }
        value
    }

    // `retain` keeps the remaining fields in order
    fn exclude_fields(&self, fields: &mut Map<String, Value>) {
        fields.retain(|name, _| !self.exclude.contains(&name.as_str()));
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(fields) => {
            fields.retain(|_, v| !v.is_null());
            for v in fields.values_mut() {
                strip_nulls(v);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                strip_nulls(item);
            }
        }
        _ => {}
    }
}

// =============================================================================
// Registrations
// =============================================================================

/// One registered endpoint: its route, method handler and response rules.
pub struct Registration {
    pub name: EndpointName,
    pub path: &'static str,
    pub response_model: ResponseModel,
    pub handler: MethodRouter<TilerState>,
}

impl Registration {
    pub fn new(
        name: EndpointName,
        path: &'static str,
        response_model: ResponseModel,
        handler: MethodRouter<TilerState>,
    ) -> Self {
        Self {
            name,
            path,
            response_model,
            handler,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("response_model", &self.response_model)
            .finish_non_exhaustive()
    }
}

/// The full set of endpoint registrations of a tiler.
#[derive(Debug, Default)]
pub struct EndpointTable {
    entries: BTreeMap<EndpointName, Registration>,
    overridden: Vec<EndpointName>,
}

impl EndpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a registration.
    pub fn register(&mut self, registration: Registration) {
        self.entries.insert(registration.name, registration);
    }

    /// Replace the handler and response rules of an endpoint, keeping its path.
    ///
    /// Registers the endpoint at its conventional path if the table did not
    /// contain it.
    pub fn override_with(
        mut self,
        name: EndpointName,
        response_model: ResponseModel,
        handler: MethodRouter<TilerState>,
    ) -> Self {
        let path = self
            .entries
            .get(&name)
            .map(|r| r.path)
            .unwrap_or_else(|| default_path(name));
        self.entries
            .insert(name, Registration::new(name, path, response_model, handler));
        if !self.overridden.contains(&name) {
            self.overridden.push(name);
        }
        self
    }

    pub fn get(&self, name: EndpointName) -> Option<&Registration> {
        self.entries.get(&name)
    }

    pub fn path(&self, name: EndpointName) -> Option<&'static str> {
        self.entries.get(&name).map(|r| r.path)
    }

    pub fn response_model(&self, name: EndpointName) -> ResponseModel {
        self.entries
            .get(&name)
            .map(|r| r.response_model)
            .unwrap_or(ResponseModel::PASSTHROUGH)
    }

    /// Registered endpoint names, in a stable order.
    pub fn names(&self) -> Vec<EndpointName> {
        self.entries.keys().copied().collect()
    }

    /// Endpoints replaced through [`override_with`](Self::override_with).
    pub fn overridden(&self) -> &[EndpointName] {
        &self.overridden
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a router with one route per registration.
    pub fn into_router(self, state: TilerState) -> Router {
        let mut router = Router::new();
        for (_, registration) in self.entries {
            router = router.route(registration.path, registration.handler);
        }
        router.with_state(state)
    }
}

/// Conventional route of each endpoint.
pub fn default_path(name: EndpointName) -> &'static str {
    match name {
        EndpointName::Tile => "/tiles/{z}/{x}/{y}",
        EndpointName::TileJson => "/tilejson.json",
        EndpointName::Bounds => "/bounds",
        EndpointName::Info => "/info",
        EndpointName::Metadata => "/metadata",
        EndpointName::Preview => "/preview",
    }
}
