// HTTP surface: the table page, a JSON view of the same data, error pages,
// and the dashboard guard.

pub mod error;
pub mod guard;
pub mod query;
pub mod render;

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::Uri;
use axum::middleware;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::data::{DataSource, PlayerRow};
use crate::table;

use self::error::{ApiError, ErrorPage, PageError};

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub source: Arc<DataSource>,
}

impl AppState {
    pub fn new(config: Config, source: DataSource) -> Self {
        AppState {
            config: Arc::new(config),
            source: Arc::new(source),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/players", get(api_players))
        .route("/forbidden", get(forbidden))
        .fallback(not_found)
        .layer(middleware::from_fn(guard::require_auth_token))
        .with_state(state)
}

/// Bind the configured address and serve until `shutdown` resolves.
pub async fn serve<F>(state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(state.config.server.bind_addr()).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(State(state): State<AppState>, uri: Uri) -> Result<Html<String>, ErrorPage> {
    let dataset = state
        .source
        .dataset()
        .await
        .map_err(|e| PageError::from(e).page(&state.config, uri.to_string()))?;

    let table_state = query::parse_state(
        uri.query().unwrap_or(""),
        &dataset,
        state.config.default_page_size,
    );
    let view = table::derive(dataset.rows(), &table_state);
    Ok(Html(render::table_page(
        &state.config.site,
        &dataset,
        &table_state,
        &view,
    )))
}

/// JSON body for `/api/players`.
#[derive(Debug, Serialize)]
pub struct PlayersPage {
    pub total: usize,
    pub filtered: usize,
    /// One-based, as in the page query parameter.
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub rows: Vec<PlayerRow>,
}

async fn api_players(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Json<PlayersPage>, ApiError> {
    let dataset = state.source.dataset().await?;
    let table_state = query::parse_state(
        uri.query().unwrap_or(""),
        &dataset,
        state.config.default_page_size,
    );
    let view = table::derive(dataset.rows(), &table_state);
    let page = PlayersPage {
        total: view.total_count(),
        filtered: view.filtered_count(),
        page: view.page_index() + 1,
        page_size: view.page_size(),
        page_count: view.page_count(),
        rows: view.rows().iter().map(|row| (*row).clone()).collect(),
    };
    Ok(Json(page))
}

async fn forbidden(State(state): State<AppState>) -> ErrorPage {
    PageError::Forbidden.page(&state.config, "/")
}

async fn not_found(State(state): State<AppState>) -> ErrorPage {
    PageError::NotFound.page(&state.config, "/")
}
