//! HTTP surface over the coordinator.
//!
//! Every handler is a thin wrapper: the coordinator owns the state and the
//! rules, the handlers translate JSON in and out and map failures to status
//! codes.

use crate::client::HotelInfoEntry;
use crate::coordinator::{Coordinator, CoordinatorError, CoordinatorSnapshot};
use crate::location::{LocationSelection, SelectedLocation};
use crate::presentation::{AnalysisAnswer, ChatMessage};
use crate::session::SessionId;
use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared state for the API router
pub struct ApiState {
    pub coordinator: Coordinator,
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchPickRequest {
    pub label: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct MapClickRequest {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub location: SelectedLocation,
    /// `None` when the backend could not create the session folder
    pub session: Option<SessionId>,
}

impl From<LocationSelection> for SelectionResponse {
    fn from(selection: LocationSelection) -> Self {
        Self {
            location: selection.location,
            session: selection.session,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ScrapeContentResponse {
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TravelPlanRequest {
    /// Empty means "use the current event links"
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TravelPlanStarted {
    pub urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/location/search
async fn post_search_pick(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<SearchPickRequest>,
) -> Json<SelectionResponse> {
    let selection = state
        .coordinator
        .select_from_search(&req.label, req.lat, req.lng)
        .await;
    Json(selection.into())
}

/// POST /api/location/click
async fn post_map_click(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<MapClickRequest>,
) -> Json<SelectionResponse> {
    let selection = state.coordinator.select_from_click(req.lat, req.lng).await;
    Json(selection.into())
}

/// GET /api/state
async fn get_state(State(state): State<Arc<ApiState>>) -> Json<CoordinatorSnapshot> {
    Json(state.coordinator.snapshot().await)
}

/// DELETE /api/search
async fn delete_search(State(state): State<Arc<ApiState>>) -> StatusCode {
    state.coordinator.orchestrator().cancel_search().await;
    StatusCode::NO_CONTENT
}

/// POST /api/scrape
async fn post_scrape(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<ScrapeRequest>,
) -> Result<Json<ScrapeContentResponse>, ApiError> {
    let response = state.coordinator.scrape(&req.url).await?;
    Ok(Json(ScrapeContentResponse {
        content: response.display_text(),
    }))
}

/// POST /api/travel-plan
///
/// Returns as soon as the request is in flight; progress shows up in
/// `GET /api/state`.
async fn post_travel_plan(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<TravelPlanRequest>,
) -> Result<(StatusCode, Json<TravelPlanStarted>), ApiError> {
    let urls = state.coordinator.start_travel_plan(req.urls).await?;
    Ok((StatusCode::ACCEPTED, Json(TravelPlanStarted { urls })))
}

/// DELETE /api/travel-plan
async fn delete_travel_plan(State(state): State<Arc<ApiState>>) -> StatusCode {
    state.coordinator.cancel_travel_plan().await;
    StatusCode::NO_CONTENT
}

/// POST /api/analyze
async fn post_analyze(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<AnalysisAnswer>>, ApiError> {
    Ok(Json(state.coordinator.analyze().await?))
}

/// POST /api/hotel-info
async fn post_hotel_info(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<HotelInfoEntry>>, ApiError> {
    Ok(Json(state.coordinator.generate_hotel_info().await?))
}

/// GET /api/chat
async fn get_chat(State(state): State<Arc<ApiState>>) -> Json<Vec<ChatMessage>> {
    Json(state.coordinator.chat_transcript().await)
}

/// POST /api/chat
///
/// Blank messages are dropped with `204 No Content`.
async fn post_chat(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    match state.coordinator.chat(&req.message).await? {
        Some(reply) => Ok(Json(reply).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ApiError(CoordinatorError);

impl From<CoordinatorError> for ApiError {
    fn from(e: CoordinatorError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            CoordinatorError::MissingSession | CoordinatorError::NoEventUrls => {
                StatusCode::CONFLICT
            }
            CoordinatorError::Backend(_) => StatusCode::BAD_GATEWAY,
        };
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn create_router(coordinator: Coordinator) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/api/location/search", post(post_search_pick))
        .route("/api/location/click", post(post_map_click))
        .route("/api/state", get(get_state))
        .route("/api/search", delete(delete_search))
        .route("/api/scrape", post(post_scrape))
        .route(
            "/api/travel-plan",
            post(post_travel_plan).delete(delete_travel_plan),
        )
        .route("/api/analyze", post(post_analyze))
        .route("/api/hotel-info", post(post_hotel_info))
        .route("/api/chat", get(get_chat).post(post_chat))
        .layer(cors)
        .with_state(Arc::new(ApiState { coordinator }))
}
