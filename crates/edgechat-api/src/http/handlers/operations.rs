//! POST /api/v1/operations - Tagged operation dispatch.
//!
//! Accepts any [`ChatRequest`] variant, e.g.
//! `{"operation": "sendMessage", "content": "Hello"}`. Unknown operations
//! and missing required fields are rejected before the resolver runs.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use uuid::Uuid;

use edgechat_types::api::{ChatRequest, ChatResponse};

use crate::http::error::AppError;
use crate::http::extractors::client::ClientIdentity;
use crate::http::response::ApiResponse;
use crate::state::AppState;

pub async fn dispatch(
    State(state): State<AppState>,
    ClientIdentity(client_id): ClientIdentity,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChatResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();
    let Json(request) = request?;

    let response = state.resolver.handle(request, &client_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(response, request_id, elapsed)))
}
