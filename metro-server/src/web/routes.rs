//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use tower_http::services::{ServeDir, ServeFile};
use tracing::warn;

use crate::domain::{DayType, StationName, TimeOfDay};
use crate::network::Network;
use crate::planner::{RouteError, RouteQuery};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory; the map page
/// is its `index.html`.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(format!("{static_dir}/index.html")))
        .route("/health", get(health))
        .route("/api/stations", get(station_points))
        .route("/api/stations/search", get(search_stations))
        .route("/api/stations/:name", get(station_record))
        .route("/api/lines", get(line_summaries))
        .route("/api/route", post(plan_route))
        .route("/api/stats", get(stats))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Names of the lines serving a station, sorted.
fn line_names(network: &Network, station: &str) -> Vec<String> {
    network
        .lines_serving(station)
        .into_iter()
        .map(|line| line.name().as_str().to_string())
        .collect()
}

/// All stations as a GeoJSON FeatureCollection for the map layer.
async fn station_points(State(state): State<AppState>) -> Json<StationCollection> {
    let snapshot = state.service.snapshot().await;
    let features = snapshot
        .network
        .stations()
        .into_iter()
        .map(|station| {
            StationFeature::new(station, line_names(&snapshot.network, station.name.as_str()))
        })
        .collect();

    Json(StationCollection::new(features))
}

/// Search stations by name substring.
async fn search_stations(
    State(state): State<AppState>,
    Query(req): Query<StationSearchRequest>,
) -> Json<Vec<StationRecord>> {
    let matches = state.service.search_stations(&req.q).await;
    let snapshot = state.service.snapshot().await;

    let records = matches
        .iter()
        .map(|station| {
            StationRecord::new(station, line_names(&snapshot.network, station.name.as_str()))
        })
        .collect();

    Json(records)
}

/// Single station record, or 404.
async fn station_record(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StationRecord>, AppError> {
    let snapshot = state.service.snapshot().await;
    let station = snapshot
        .network
        .station(&name)
        .ok_or_else(|| AppError::NotFound {
            message: format!("unknown station: {name}"),
        })?;

    Ok(Json(StationRecord::new(
        station,
        line_names(&snapshot.network, station.name.as_str()),
    )))
}

/// All lines in overview form.
async fn line_summaries(State(state): State<AppState>) -> Json<Vec<LineSummary>> {
    let snapshot = state.service.snapshot().await;
    let summaries = snapshot
        .network
        .lines()
        .into_iter()
        .map(LineSummary::from_line)
        .collect();

    Json(summaries)
}

/// Plan a route between two stations.
async fn plan_route(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RouteResponse>, AppError> {
    // Parse JSON by hand so malformed bodies get the typed error shape.
    let req: RouteRequest = serde_json::from_slice(&body).map_err(|e| AppError::BadRequest {
        message: format!("invalid request body: {e}"),
    })?;

    let origin = StationName::new(&req.origin).map_err(|_| AppError::BadRequest {
        message: "origin must not be blank".to_string(),
    })?;
    let destination = StationName::new(&req.destination).map_err(|_| AppError::BadRequest {
        message: "destination must not be blank".to_string(),
    })?;

    let now = Local::now();
    let departure = match req.departure.as_deref() {
        Some(raw) => TimeOfDay::parse(raw).map_err(|e| AppError::BadRequest {
            message: format!("invalid departure time {raw:?}: {e}"),
        })?,
        None => TimeOfDay::from_naive(now.time()),
    };
    let day = req
        .day_type
        .unwrap_or_else(|| DayType::for_date(now.date_naive()));

    let query = RouteQuery::new(origin, destination, departure, day)
        .with_goal(req.optimize.unwrap_or_default());
    let itinerary = state.service.find_route(query).await?;

    Ok(Json(RouteResponse::from_itinerary(&itinerary)))
}

/// Service counters: model size, revision, and cache occupancy.
async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let snapshot = state.service.snapshot().await;

    Json(StatsResponse {
        stations: snapshot.network.station_count(),
        lines: snapshot.network.line_count(),
        revision: snapshot.network.revision(),
        cached_routes: state.service.cached_route_count(),
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl From<RouteError> for AppError {
    fn from(e: RouteError) -> Self {
        // Unknown stations and not-found route outcomes are all 404s.
        AppError::NotFound {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, error = %message, "request failed");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
