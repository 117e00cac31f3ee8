//! HTTP preview of the heatmap.
//!
//! Routes:
//!   GET  /                 → HTML page with the year's heatmap inline
//!   GET  /heatmap.svg      → rendered SVG (`?year=&width=&hover=`)
//!   GET  /api/window       → window announced for `?year=`
//!   GET  /api/health       → health check

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::{Datelike, Local};
use heatmap_common::protocol::HealthResponse;
use heatmap_common::{ActivityRecord, Settings, WindowChange};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::render::{self, Hover, RenderError, RenderRequest};

/// Shared state for route handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub records: Arc<Vec<ActivityRecord>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, records: Vec<ActivityRecord>) -> Self {
        Self {
            settings: Arc::new(settings),
            records: Arc::new(records),
            start_time: Instant::now(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SvgQuery {
    pub year: Option<i32>,
    pub width: Option<f64>,
    pub hover: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/heatmap.svg", get(heatmap_svg))
        .route("/api/window", get(window))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server. Blocks until shutdown.
pub async fn run(
    state: AppState,
    listen_addr: &str,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    info!("Heatmap preview listening on http://{listen_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
            }
        })
        .await?;

    Ok(())
}

// ── route handlers ───────────────────────────────────────────────────────

async fn index(State(state): State<AppState>, Query(query): Query<YearQuery>) -> Response {
    let year = query.year.unwrap_or_else(|| Local::now().year());
    let request = RenderRequest {
        year: Some(year),
        ..RenderRequest::default()
    };
    match render::render_svg(&state.settings, &state.records, &request) {
        Ok(svg) => Html(page(year, &svg)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn heatmap_svg(State(state): State<AppState>, Query(query): Query<SvgQuery>) -> Response {
    let hover = match query.hover.as_deref().map(str::parse::<Hover>).transpose() {
        Ok(hover) => hover,
        Err(e) => return error_response(e),
    };
    let request = RenderRequest {
        year: query.year,
        width: query.width,
        hover,
    };
    match render::render_svg(&state.settings, &state.records, &request) {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(e) => error_response(e),
    }
}

async fn window(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<WindowChange>, Response> {
    render::window_change(&state.settings, query.year)
        .map(Json)
        .map_err(error_response)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        records: state.records.len(),
    })
}

fn error_response(e: RenderError) -> Response {
    let status = match e {
        RenderError::InvalidHover(_) | RenderError::InvalidYear(_) => StatusCode::BAD_REQUEST,
        RenderError::Heatmap(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!("Request failed: {e}");
    (status, e.to_string()).into_response()
}

fn page(year: i32, svg: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Contributions {year}</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
nav a {{ margin-right: 1rem; }}
</style>
</head>
<body>
<nav><a href="/?year={prev}">&larr; {prev}</a><a href="/?year={next}">{next} &rarr;</a></nav>
{svg}
</body>
</html>
"#,
        prev = year - 1,
        next = year + 1,
    )
}

// ─── tests ───────────────────────────────────────────────────────────────
