//! Session HTTP handlers.
//!
//! Endpoints:
//! - GET  /api/v1/sessions/{id} - Get a session with its messages (`data: null` if absent)
//! - POST /api/v1/sessions      - Create an empty session

use std::time::Instant;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use edgechat_types::api::SessionSummary;
use edgechat_types::chat::ChatSession;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for creating a session.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionBody {
    #[serde(default)]
    pub title: Option<String>,
}

/// GET /api/v1/sessions/{id} - Get a session by ID.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Option<ChatSession>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = state.resolver.get_chat_history(&session_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(session, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{session_id}"));

    Ok(Json(resp))
}

/// POST /api/v1/sessions - Create a session.
///
/// An empty body is accepted and yields the default title.
pub async fn create_session(
    State(state): State<AppState>,
    body: Result<Json<CreateSessionBody>, JsonRejection>,
) -> Result<Json<ApiResponse<SessionSummary>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let body = match body {
        Ok(Json(body)) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => CreateSessionBody::default(),
        Err(e) => return Err(e.into()),
    };

    let summary = state.resolver.create_session(body.title.as_deref()).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let self_link = format!("/api/v1/sessions/{}", summary.id);
    let resp = ApiResponse::success(summary, request_id, elapsed).with_link("self", &self_link);

    Ok(Json(resp))
}
