//! HTTP surface: `GET /` usage text and `POST /scrape`.

use crate::browser::Launcher;
use crate::config::ScraperConfig;
use crate::filter::SortOrder;
use crate::results::ReviewRecord;
use crate::scrapers::{ScrapeError, ScrapeRequest, run_scrape};
use crate::utils::hotel_url;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;

/// State shared by the request handlers
pub struct AppState<L> {
    launcher: Arc<L>,
    config: Arc<ScraperConfig>,
    scrape_permits: Arc<Semaphore>,
}

impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            launcher: Arc::clone(&self.launcher),
            config: Arc::clone(&self.config),
            scrape_permits: Arc::clone(&self.scrape_permits),
        }
    }
}

impl<L: Launcher> AppState<L> {
    pub fn new(launcher: L, config: ScraperConfig) -> Self {
        let permits = config.max_concurrent_scrapes.max(1);
        Self {
            launcher: Arc::new(launcher),
            config: Arc::new(config),
            scrape_permits: Arc::new(Semaphore::new(permits)),
        }
    }
}

/// Body of `POST /scrape`
#[derive(Debug, Deserialize)]
pub struct ScrapeBody {
    #[serde(default)]
    pub hotel_name: Option<String>,

    #[serde(default)]
    pub sort: SortOrder,

    #[serde(default)]
    pub max_pages: Option<usize>,
}

/// Errors reported to HTTP callers as `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No hotel name provided")]
    MissingHotelName,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("max_pages must be at least 1")]
    NoPages,

    #[error("Invalid hotel URL: {0}")]
    HotelUrl(#[from] url::ParseError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error("Server is shutting down")]
    ShuttingDown,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingHotelName | ApiError::InvalidBody(_) | ApiError::NoPages => {
                StatusCode::BAD_REQUEST
            }
            ApiError::HotelUrl(_) | ApiError::Scrape(_) | ApiError::ShuttingDown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            ::log::error!("Scrape request failed: {}", self);
        } else {
            ::log::info!("Rejected scrape request: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Build the router for the scraping API
pub fn router<L: Launcher + 'static>(state: AppState<L>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/scrape", post(scrape::<L>))
        .with_state(state)
}

/// Serve the API on `addr` until the process stops
pub async fn serve<L: Launcher + 'static>(
    addr: SocketAddr,
    state: AppState<L>,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    ::log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}

async fn home() -> Json<Value> {
    Json(json!({
        "message": "Hotel review scraping API. Use POST /scrape with {\"hotel_name\": \"...\"}"
    }))
}

/// Runs a full scrape for the named hotel and answers with its records
async fn scrape<L: Launcher + 'static>(
    State(state): State<AppState<L>>,
    body: Result<Json<ScrapeBody>, JsonRejection>,
) -> Result<Json<Vec<ReviewRecord>>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;

    let hotel_name = body
        .hotel_name
        .filter(|name| !name.trim().is_empty())
        .ok_or(ApiError::MissingHotelName)?;
    let max_pages = body.max_pages.unwrap_or(state.config.max_pages);
    if max_pages == 0 {
        return Err(ApiError::NoPages);
    }
    let url = hotel_url(&state.config.url_template, &hotel_name)?;

    ::log::info!("Scrape requested for {} ({})", hotel_name, url);
    let _permit = state
        .scrape_permits
        .acquire()
        .await
        .map_err(|_| ApiError::ShuttingDown)?;

    let request = ScrapeRequest::new(url.as_str())
        .with_sort(body.sort)
        .with_max_pages(max_pages);
    let records = run_scrape(state.launcher.as_ref(), &state.config, &request).await?;
    Ok(Json(records))
}
