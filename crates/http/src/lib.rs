//! Fixture content API for the SiteSearch widget.
//!
//! Serves a JSON fixture through the same routes as a WordPress REST API
//! (`/wp-json/wp/v2/{type}/?search=`), so the widget can be developed and
//! tested end to end without a live site.

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use sitesearch_core::types::{ContentItem, DEFAULT_API_PATH};

/// Page size when the request does not set `per_page`.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Largest `per_page` the API accepts.
pub const MAX_PER_PAGE: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("could not read fixture {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fixture {path} is not a map of collection name to items: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// Collections served by the fixture API, keyed by content type.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    collections: BTreeMap<String, Vec<ContentItem>>,
}

impl Fixture {
    pub fn new(collections: BTreeMap<String, Vec<ContentItem>>) -> Self {
        Self { collections }
    }

    /// Load `{ "posts": [...], "pages": [...] }` from a JSON file.
    pub fn load(path: &std::path::Path) -> Result<Self, FixtureError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| FixtureError::Read { path: display.clone(), source })?;
        let collections =
            serde_json::from_str(&raw).map_err(|source| FixtureError::Parse { path: display, source })?;
        Ok(Self { collections })
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn item_count(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    /// Loose search like the remote API: any whitespace-separated term found in
    /// the title is a hit. `None` when the collection does not exist.
    pub fn search(&self, content_type: &str, search: Option<&str>, per_page: usize) -> Option<Vec<ContentItem>> {
        let items = self.collections.get(content_type)?;
        let terms: Vec<String> = search
            .unwrap_or("")
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        let hits = items
            .iter()
            .filter(|item| {
                if terms.is_empty() {
                    return true;
                }
                let title = item.title_html().to_lowercase();
                terms.iter().any(|t| title.contains(t.as_str()))
            })
            .take(per_page)
            .cloned()
            .collect();
        Some(hits)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CollectionQuery {
    search: Option<String>,
    per_page: Option<String>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn rest_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    (
        status,
        Json(serde_json::json!({
            "code": code,
            "message": message,
            "data": { "status": status.as_u16() },
        })),
    )
}

fn parse_per_page(raw: Option<&str>) -> Result<usize, ApiError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_PER_PAGE);
    };
    match raw.parse::<usize>() {
        Ok(n) if (1..=MAX_PER_PAGE).contains(&n) => Ok(n),
        _ => Err(rest_error(
            StatusCode::BAD_REQUEST,
            "rest_invalid_param",
            &format!("per_page must be between 1 (inclusive) and {MAX_PER_PAGE} (inclusive)"),
        )),
    }
}

pub async fn api_collection(
    State(fixture): State<Arc<Fixture>>,
    Path(collection): Path<String>,
    Query(q): Query<CollectionQuery>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    let per_page = parse_per_page(q.per_page.as_deref())?;
    let items = fixture.search(&collection, q.search.as_deref(), per_page).ok_or_else(|| {
        rest_error(
            StatusCode::NOT_FOUND,
            "rest_no_route",
            "No route was found matching the URL and request method.",
        )
    })?;
    debug!(collection = collection.as_str(), search = ?q.search, count = items.len(), "Collection search");
    Ok(Json(items))
}

pub async fn api_health() -> &'static str {
    "ok"
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the fixture API. With `dist`, unmatched paths are served from that
/// directory, falling back to its `index.html`.
pub fn router(fixture: Arc<Fixture>, dist: Option<&std::path::Path>) -> Router {
    info!(
        collections = ?fixture.collection_names().collect::<Vec<_>>(),
        items = fixture.item_count(),
        "Fixture loaded"
    );

    let collection_route = format!("{DEFAULT_API_PATH}/{{collection}}");
    let mut app = Router::new()
        .route("/health", get(api_health))
        .route(&collection_route, get(api_collection))
        .route(&format!("{collection_route}/"), get(api_collection));

    if let Some(dist) = dist {
        let index_html = dist.join("index.html");
        app = app.fallback_service(ServeDir::new(dist).not_found_service(ServeFile::new(index_html)));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(fixture)
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "Fixture API listening");
    }
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await
}
