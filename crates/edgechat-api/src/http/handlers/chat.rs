//! Message HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/messages                                           - Send a message
//! - POST /api/v1/sessions/{id}/messages/{message_id}/regenerate     - Regenerate an answer

use std::time::Instant;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use edgechat_types::api::{MessageResponse, RegenerateOutcome};

use crate::http::error::AppError;
use crate::http::extractors::client::ClientIdentity;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for sending a message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// POST /api/v1/messages - Send a message and receive the assistant reply.
pub async fn send_message(
    State(state): State<AppState>,
    ClientIdentity(client_id): ClientIdentity,
    body: Result<Json<SendMessageBody>, JsonRejection>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();
    let Json(body) = body?;

    let reply = state
        .resolver
        .send_message(body.content.as_deref(), body.session_id, &client_id)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let session_link = format!("/api/v1/sessions/{}", reply.session_id);
    let resp = ApiResponse::success(reply, request_id, elapsed).with_link("session", &session_link);

    Ok(Json(resp))
}

/// POST /api/v1/sessions/{id}/messages/{message_id}/regenerate
pub async fn regenerate(
    State(state): State<AppState>,
    ClientIdentity(client_id): ClientIdentity,
    Path((session_id, message_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<RegenerateOutcome>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let outcome = state
        .resolver
        .regenerate(&session_id, &message_id, &client_id)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(outcome, request_id, elapsed)
        .with_link("session", &format!("/api/v1/sessions/{session_id}"));

    Ok(Json(resp))
}
