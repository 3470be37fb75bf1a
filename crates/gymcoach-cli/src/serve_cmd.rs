use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router, routing::post};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use gymcoach_core::activity::{self, LogEntry};
use gymcoach_core::chat::{self, ChatConfig, ChatError};
use gymcoach_core::plan::{self, month_overview, parse_plan_date};
use gymcoach_core::token::{SessionClaims, SessionConfig, verify_token};
use gymcoach_core::user::{self, ProfileInput, RegisterInput};
use gymcoach_core::CoachError;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Shared, read-only request context.
pub struct AppState {
    pub pool: PgPool,
    pub sessions: SessionConfig,
    pub chat: ChatConfig,
}

type SharedState = Arc<AppState>;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
    /// Chat failures also carry a `response` field so chat clients can show
    /// the error inline.
    chat_reply: bool,
}

impl AppError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            chat_reply: false,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }
}

impl From<CoachError> for AppError {
    fn from(err: CoachError) -> Self {
        match err {
            CoachError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            CoachError::Unauthorized(msg) => Self::new(StatusCode::UNAUTHORIZED, msg),
            CoachError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            CoachError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            CoachError::Storage(e) => {
                tracing::error!(error = format!("{e:#}"), "storage error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "database error")
            }
            CoachError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        let status = if err.is_configuration() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::BAD_GATEWAY
        };
        tracing::warn!(error = %err, "chat relay failed");
        Self {
            status,
            message: err.to_string(),
            chat_reply: true,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = if self.chat_reply {
            serde_json::json!({
                "response": format!("Error: {}", self.message),
                "error": self.message,
            })
        } else {
            serde_json::json!({ "error": self.message })
        };
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    Register,
    Login,
    Update,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub action: UserAction,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub name: Option<String>,
    pub goal: Option<String>,
    pub restrictions: Option<String>,
    pub frequency: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/plans/workout", get(get_workout))
        .route("/plans/nutrition", get(get_nutrition))
        .route("/plans/calendar", get(get_calendar))
        .route("/users", post(post_user).get(get_user))
        .route("/chat", post(post_chat))
        .route("/log", post(post_log))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    if state.chat.api_key.is_none() {
        tracing::warn!("no chat API key configured; /chat will answer with a configuration error");
    }
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("gymcoach serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("gymcoach serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C; shutting down");
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate the `Authorization: Bearer <token>` header, if present.
fn bearer_claims(state: &AppState, headers: &HeaderMap) -> Result<Option<SessionClaims>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| AppError::unauthorized("malformed Authorization header"))?;

    let claims = verify_token(&state.sessions, token).map_err(|e| {
        tracing::debug!(error = %e, "rejected session token");
        AppError::unauthorized("invalid or expired session token")
    })?;
    Ok(Some(claims))
}

fn required_date(query: &DateQuery) -> Result<chrono::NaiveDate, AppError> {
    let raw = query
        .date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("date is required (YYYY-MM-DD)"))?;
    Ok(parse_plan_date(raw)?)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "gymcoach backend is running" }))
}

async fn get_workout(
    State(state): State<SharedState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Result<axum::response::Response, AppError> {
    let Query(query) = query?;
    let date = required_date(&query)?;
    let resolved = plan::resolve_workout(&state.pool, date).await?;
    tracing::info!(%date, source = %resolved.source(), "workout served");
    Ok(Json(resolved).into_response())
}

async fn get_nutrition(
    State(state): State<SharedState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Result<axum::response::Response, AppError> {
    let Query(query) = query?;
    let date = required_date(&query)?;
    let resolved = plan::resolve_nutrition(&state.pool, date).await?;
    tracing::info!(%date, source = %resolved.source(), "nutrition served");
    Ok(Json(resolved).into_response())
}

async fn get_calendar(
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> Result<axum::response::Response, AppError> {
    let Query(query) = query?;
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());
    let days = month_overview(year, month)?;
    Ok(Json(days).into_response())
}

async fn post_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(req) = payload?;

    match req.action {
        UserAction::Register => {
            let auth = user::register(
                &state.pool,
                &state.sessions,
                RegisterInput {
                    email: req.email,
                    password: req.password,
                    name: req.name,
                    goal: req.goal,
                    restrictions: req.restrictions,
                    frequency: req.frequency,
                    image_url: req.image_url,
                },
            )
            .await?;
            Ok((StatusCode::CREATED, Json(auth)).into_response())
        }
        UserAction::Login => {
            let auth = user::login(&state.pool, &state.sessions, &req.email, &req.password).await?;
            Ok(Json(auth).into_response())
        }
        UserAction::Update => {
            let claims = bearer_claims(&state, &headers)?
                .ok_or_else(|| AppError::unauthorized("update requires a bearer token"))?;
            let updated = user::update_profile(
                &state.pool,
                claims.user_id,
                ProfileInput {
                    email: req.email,
                    password: Some(req.password),
                    name: req.name,
                    goal: req.goal,
                    restrictions: req.restrictions,
                    frequency: req.frequency,
                    image_url: req.image_url,
                },
            )
            .await?;
            Ok(Json(updated).into_response())
        }
    }
}

async fn get_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<axum::response::Response, AppError> {
    let Query(query) = query?;
    let id = match query.id.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Uuid::parse_str(raw)
            .map_err(|e| AppError::bad_request(format!("invalid user id {raw:?}: {e}")))?,
        None => {
            bearer_claims(&state, &headers)?
                .ok_or_else(|| AppError::bad_request("id query parameter or bearer token required"))?
                .user_id
        }
    };

    let found = user::fetch_user(&state.pool, id).await?;
    Ok(Json(found).into_response())
}

async fn post_chat(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(req) = payload?;
    if req.message.trim().is_empty() {
        return Err(AppError::bad_request("message is required"));
    }

    let response = chat::relay(&state.chat, &req.message).await?;
    Ok(Json(ChatResponse { response }).into_response())
}

async fn post_log(
    payload: Result<Json<LogEntry>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(entry) = payload?;
    let ack = activity::acknowledge(&entry)?;
    Ok(Json(ack).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
