use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::attendance::{AttendanceError, AttendanceStatus};
use crate::config::Config;
use crate::metrics::render_metrics;
use crate::noshow::{Rsvp, SessionForecast};
use crate::reliability::{InvalidScoreError, Tier};
use crate::service::{PlayerReport, ReliabilityService};

/// JSON API over the reliability service
pub struct WebServer {
    service: Arc<ReliabilityService>,
    config: Arc<Config>,
}

#[derive(Clone)]
struct AppState {
    service: Arc<ReliabilityService>,
}

#[derive(Deserialize)]
struct JournalQuery {
    session: Option<String>,
    user: Option<String>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct CheckInBody {
    user_id: String,
    status: String,
}

#[derive(Deserialize)]
struct ForecastBody {
    rsvps: Vec<Rsvp>,
}

/// Errors surfaced to API callers as `{"error": "..."}`
enum ApiError {
    InvalidScore(InvalidScoreError),
    Attendance(AttendanceError),
    NotFound(String),
}

impl From<InvalidScoreError> for ApiError {
    fn from(e: InvalidScoreError) -> Self {
        ApiError::InvalidScore(e)
    }
}

impl From<AttendanceError> for ApiError {
    fn from(e: AttendanceError) -> Self {
        ApiError::Attendance(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidScore(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Attendance(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("Not found: {}", what)),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl WebServer {
    pub fn new(service: Arc<ReliabilityService>, config: Arc<Config>) -> Self {
        Self { service, config }
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            service: self.service.clone(),
        };

        Router::new()
            .route("/api/tiers", get(api_tiers))
            .route("/api/classify/:score", get(api_classify))
            .route(
                "/api/sessions/:session_id/check-ins",
                get(api_session_check_ins).post(api_check_in),
            )
            .route("/api/sessions/predict", post(api_predict))
            .route("/api/users/:user_id/stats", get(api_user_stats))
            .route("/api/leaderboard", get(api_leaderboard))
            .route("/api/journal", get(api_journal))
            .route("/api/stats", get(api_stats))
            .route("/metrics", get(metrics))
            .with_state(state)
            .layer(CorsLayer::permissive())
    }

    /// Serve until `shutdown` resolves. With the API disabled this still
    /// waits for `shutdown`, so the process does not exit on its own.
    pub async fn run<F>(&self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.config.web.enabled {
            warn!("Web API disabled in config, idling until shutdown");
            shutdown.await;
            return Ok(());
        }

        let addr = format!("{}:{}", self.config.web.address, self.config.web.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind web API on {}: {}", addr, e))?;
        info!("🎮 Web API listening on http://{}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }

    pub async fn serve(&self, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

/// Tier table with score ranges
async fn api_tiers() -> Json<serde_json::Value> {
    let tiers: Vec<serde_json::Value> = Tier::ALL
        .iter()
        .rev()
        .map(|t| {
            let (min, max) = t.score_range();
            serde_json::json!({
                "tier": t,
                "label": t.label(),
                "rank": t.rank(),
                "min_score": min,
                "max_score": max,
                "icon": t.icon(),
                "emoji": t.emoji(),
                "color": t.color_token(),
            })
        })
        .collect();
    Json(serde_json::json!({ "tiers": tiers }))
}

async fn api_classify(
    State(state): State<AppState>,
    Path(score): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let tier = state.service.classify_str(&score)?;
    Ok(Json(serde_json::json!({
        "score": score.trim(),
        "tier": tier,
        "icon": tier.tier.icon(),
        "emoji": tier.tier.emoji(),
        "color": tier.tier.color_token(),
    })))
}

async fn api_check_in(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<CheckInBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status: AttendanceStatus = body.status.parse()?;
    let outcome = state.service.record_check_in(&session_id, &body.user_id, status)?;
    Ok(Json(serde_json::json!({
        "check_in": outcome.check_in,
        "replaced": outcome.replaced,
        "stats": outcome.stats,
    })))
}

async fn api_session_check_ins(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<serde_json::Value> {
    let check_ins = state.service.ledger.session_check_ins(&session_id);
    Json(serde_json::json!({ "check_ins": check_ins }))
}

async fn api_predict(
    State(state): State<AppState>,
    Json(body): Json<ForecastBody>,
) -> Json<SessionForecast> {
    Json(state.service.forecast(&body.rsvps))
}

async fn api_user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PlayerReport>, ApiError> {
    let report = state
        .service
        .player_report(&user_id)
        .ok_or_else(|| ApiError::NotFound(format!("player '{}'", user_id)))?;
    Ok(Json(report))
}

async fn api_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "leaderboard": state.service.leaderboard(params.limit) }))
}

/// Journal API with search
async fn api_journal(
    State(state): State<AppState>,
    Query(params): Query<JournalQuery>,
) -> Json<serde_json::Value> {
    let limit = params.limit.unwrap_or(100);
    let entries = state.service.journal.search(
        params.session.as_deref(),
        params.user.as_deref(),
        limit,
    );
    Json(serde_json::json!({
        "entries": entries,
        "stats": state.service.journal.get_stats(),
    }))
}

async fn api_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.service.get_stats())
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [("content-type", "text/plain; version=0.0.4")],
        render_metrics(&state.service),
    )
}
