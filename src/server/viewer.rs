//! Viewer page linking to the tilejson and info endpoints.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::Html,
};
use http::Uri;

use crate::error::{ReaderError, TilerError};
use crate::factory::{forwarded_query, EndpointName, TilerState};

/// Replaced with the absolute tilejson URL.
pub const TILEJSON_PLACEHOLDER: &str = "{{tilejson}}";

/// Replaced with the absolute info URL.
pub const INFO_PLACEHOLDER: &str = "{{info}}";

const DEFAULT_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>STAC Viewer</title>
    <link rel="stylesheet" href="https://unpkg.com/maplibre-gl@4/dist/maplibre-gl.css">
    <script src="https://unpkg.com/maplibre-gl@4/dist/maplibre-gl.js"></script>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        html, body { height: 100%; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; }
        #map { position: absolute; top: 0; bottom: 0; width: 100%; }
        #menu {
            position: absolute; top: 12px; left: 12px; z-index: 1;
            background: rgba(20, 20, 30, 0.9); color: #eee;
            padding: 10px 12px; border-radius: 6px; font-size: 13px;
        }
        #menu select { margin-left: 6px; }
    </style>
</head>
<body>
    <div id="map" data-tilejson="{{tilejson}}" data-info="{{info}}"></div>
    <div id="menu"><label>Asset<select id="asset"></select></label></div>
    <script>
        const el = document.getElementById('map');
        const tilejsonUrl = new URL(el.dataset.tilejson);
        const infoUrl = new URL(el.dataset.info);

        const map = new maplibregl.Map({
            container: 'map',
            style: { version: 8, sources: {}, layers: [] },
            center: [0, 0],
            zoom: 1
        });

        function show(asset) {
            const url = new URL(tilejsonUrl);
            url.searchParams.set('assets', asset);
            if (map.getLayer('raster')) map.removeLayer('raster');
            if (map.getSource('raster')) map.removeSource('raster');
            fetch(url).then(r => r.json()).then(tj => {
                map.addSource('raster', { type: 'raster', tiles: tj.tiles, tileSize: 256,
                    minzoom: tj.minzoom, maxzoom: tj.maxzoom, bounds: tj.bounds });
                map.addLayer({ id: 'raster', type: 'raster', source: 'raster' });
                map.fitBounds([[tj.bounds[0], tj.bounds[1]], [tj.bounds[2], tj.bounds[3]]]);
            });
        }

        map.on('load', () => {
            fetch(infoUrl).then(r => r.json()).then(assets => {
                const select = document.getElementById('asset');
                for (const name of assets) {
                    const option = document.createElement('option');
                    option.value = option.textContent = name;
                    select.appendChild(option);
                }
                select.onchange = () => show(select.value);
                if (assets.length) show(assets[0]);
            });
        });
    </script>
</body>
</html>
"##;

/// Escape HTML special characters to prevent XSS attacks.
fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// HTML template of the viewer, loaded once at start-up.
#[derive(Debug, Clone)]
pub struct ViewerPage {
    template: String,
}

impl ViewerPage {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    /// Fill in the endpoint URLs.
    pub fn render(&self, tilejson_url: &str, info_url: &str) -> String {
        self.template
            .replace(TILEJSON_PLACEHOLDER, &html_escape(tilejson_url))
            .replace(INFO_PLACEHOLDER, &html_escape(info_url))
    }
}

impl Default for ViewerPage {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

/// State of the viewer route.
#[derive(Clone)]
pub struct ViewerState {
    pub tiler: TilerState,
    pub page: Arc<ViewerPage>,
}

/// Handle viewer requests.
///
/// # Endpoint
///
/// `GET /viewer?url={item}`
///
/// The page's query string is forwarded to both endpoint URLs.
pub async fn viewer_handler(
    State(state): State<ViewerState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Html<String>, TilerError> {
    let query = forwarded_query(&uri, &[]);
    let link = |name: EndpointName| -> Result<String, TilerError> {
        let mut url = state
            .tiler
            .url_for(&headers, name)
            .ok_or_else(|| ReaderError::Backend(format!("{} endpoint is not registered", name)))?;
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        Ok(url)
    };

    let tilejson = link(EndpointName::TileJson)?;
    let info = link(EndpointName::Info)?;

    Ok(Html(state.page.render(&tilejson, &info)))
}
