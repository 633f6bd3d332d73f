///! HTTP JSON surface
///!
///! - `GET /health`, `GET /stats`
///! - `GET /api/screens`: screen and section index
///! - `GET /api/screens/{screen}`: every section; selections as
///!   `?<section>.<field>=<value>`
///! - `GET /api/screens/{screen}/{section}`: one section; selections as
///!   `?<field>=<value>`
///! - `POST /api/screens/{screen}/refresh`, `POST /api/screens/{screen}/{section}/refresh`
///! - `PUT /api/epic/date`: retarget the EPIC gallery
///! - `/api/game/*`: launch mini-game
///!
///! Inactive sections are activated on first read.
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::module::binder::{RenderError, Section};
use crate::module::screens::game::{GameError, GamePicks, GameStatus};
use crate::module::screens::{Screen, Screens};

#[derive(Clone)]
pub struct AppState {
    screens: Arc<Screens>,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(screens: Arc<Screens>) -> Self {
        Self {
            screens,
            started_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Game(#[from] GameError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Render(RenderError::InvalidSelection(_)) => StatusCode::BAD_REQUEST,
            ApiError::Game(GameError::UnknownId { .. }) => StatusCode::NOT_FOUND,
            ApiError::Game(GameError::NotReady) => StatusCode::CONFLICT,
            ApiError::Render(RenderError::Serialize(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(stats))
        .route("/api/screens", get(list_screens))
        .route("/api/screens/{screen}", get(render_screen))
        .route("/api/screens/{screen}/refresh", post(refresh_screen))
        .route("/api/screens/{screen}/{section}", get(render_section))
        .route("/api/screens/{screen}/{section}/refresh", post(refresh_section))
        .route("/api/epic/date", put(set_epic_date))
        .route("/api/game", get(game_status))
        .route("/api/game/select", post(game_select))
        .route("/api/game/fuel", post(game_fuel))
        .route("/api/game/launch", post(game_launch))
        .route("/api/game/reset", post(game_reset))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn stats(State(state): State<AppState>) -> Json<Value> {
    let sections: Vec<&Arc<dyn Section>> = state.screens.sections().collect();
    let active = sections.iter().filter(|s| s.is_active()).count();
    Json(json!({
        "status": "running",
        "service": "cosmodeck-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "started_at": state.started_at,
        "screens": state.screens.all().len(),
        "sections": sections.len(),
        "active_sections": active,
    }))
}

async fn list_screens(State(state): State<AppState>) -> Json<Value> {
    let screens: Vec<Value> = state
        .screens
        .all()
        .iter()
        .map(|screen| {
            let sections: Vec<Value> = screen
                .sections()
                .iter()
                .map(|s| json!({ "name": s.name(), "active": s.is_active() }))
                .collect();
            json!({ "name": screen.name, "title": screen.title, "sections": sections })
        })
        .collect();
    Json(json!({ "screens": screens }))
}

fn find_screen<'a>(state: &'a AppState, name: &str) -> ApiResult<&'a Screen> {
    state
        .screens
        .get(name)
        .ok_or_else(|| ApiError::NotFound(format!("screen '{}'", name)))
}

fn find_section<'a>(screen: &'a Screen, name: &str) -> ApiResult<&'a Arc<dyn Section>> {
    screen
        .section(name)
        .ok_or_else(|| ApiError::NotFound(format!("section '{}/{}'", screen.name, name)))
}

async fn ensure_active(sections: &[Arc<dyn Section>]) {
    join_all(sections.iter().filter(|s| !s.is_active()).map(|s| s.activate())).await;
}

/// Split `section.field=value` pairs by section
fn split_query(query: HashMap<String, String>) -> HashMap<String, HashMap<String, String>> {
    let mut by_section: HashMap<String, HashMap<String, String>> = HashMap::new();
    for (key, value) in query {
        if let Some((section, field)) = key.split_once('.') {
            by_section
                .entry(section.to_string())
                .or_default()
                .insert(field.to_string(), value);
        }
    }
    by_section
}

async fn render_screen(
    State(state): State<AppState>,
    Path(screen): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let screen = find_screen(&state, &screen)?;
    ensure_active(screen.sections()).await;

    let queries = split_query(query);
    let empty = HashMap::new();
    let mut sections = Map::new();
    for section in screen.sections() {
        let query = queries.get(section.name()).unwrap_or(&empty);
        sections.insert(section.name().to_string(), section.render(query)?);
    }

    Ok(Json(json!({
        "name": screen.name,
        "title": screen.title,
        "sections": sections,
    })))
}

async fn render_section(
    State(state): State<AppState>,
    Path((screen, section)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let screen = find_screen(&state, &screen)?;
    let section = find_section(screen, &section)?;
    ensure_active(std::slice::from_ref(section)).await;
    Ok(Json(section.render(&query)?))
}

async fn refresh_screen(State(state): State<AppState>, Path(screen): Path<String>) -> ApiResult<Json<Value>> {
    let screen = find_screen(&state, &screen)?;
    ensure_active(screen.sections()).await;

    let refreshed = join_all(screen.sections().iter().map(|s| async move {
        (s.name().to_string(), Value::Bool(s.refresh().await))
    }))
    .await;

    Ok(Json(json!({
        "name": screen.name,
        "refreshed": refreshed.into_iter().collect::<Map<String, Value>>(),
    })))
}

async fn refresh_section(
    State(state): State<AppState>,
    Path((screen, section)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let screen = find_screen(&state, &screen)?;
    let section = find_section(screen, &section)?;
    ensure_active(std::slice::from_ref(section)).await;
    let refreshed = section.refresh().await;
    Ok(Json(json!({ "name": section.name(), "refreshed": refreshed })))
}

#[derive(Debug, Deserialize)]
struct EpicDateRequest {
    /// "yyyy-mm-dd"; absent or null for the latest set
    #[serde(default)]
    date: Option<String>,
}

async fn set_epic_date(
    State(state): State<AppState>,
    Json(request): Json<EpicDateRequest>,
) -> ApiResult<Json<Value>> {
    let date = request
        .date
        .as_deref()
        .map(|d| {
            NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                .map_err(|_| ApiError::BadRequest(format!("invalid date '{}', expected yyyy-mm-dd", d)))
        })
        .transpose()?;

    // Retargeting an inactive gallery only swaps the request; activation loads it
    state.screens.show_epic_date(date).await;
    let gallery = state.screens.epic_gallery();
    if !gallery.is_active() {
        gallery.activate().await;
    }
    Ok(Json(Section::render(gallery, &HashMap::new())?))
}

async fn game_status(State(state): State<AppState>) -> Json<GameStatus> {
    Json(state.screens.game().status())
}

async fn game_select(State(state): State<AppState>, Json(picks): Json<GamePicks>) -> ApiResult<Json<GameStatus>> {
    Ok(Json(state.screens.game().select(&picks)?))
}

#[derive(Debug, Deserialize)]
struct FuelRequest {
    amount: i32,
}

async fn game_fuel(State(state): State<AppState>, Json(request): Json<FuelRequest>) -> Json<GameStatus> {
    Json(state.screens.game().adjust_fuel(request.amount))
}

async fn game_launch(State(state): State<AppState>) -> ApiResult<Json<GameStatus>> {
    Ok(Json(state.screens.game().launch()?))
}

async fn game_reset(State(state): State<AppState>) -> Json<GameStatus> {
    Json(state.screens.game().reset())
}
