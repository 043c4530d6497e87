//! GET /api/v1/rate-limit - Remaining quota for the calling client.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use uuid::Uuid;

use edgechat_types::rate_limit::RateLimitStatus;

use crate::http::extractors::client::ClientIdentity;
use crate::http::response::ApiResponse;
use crate::state::AppState;

pub async fn get_rate_limit(
    State(state): State<AppState>,
    ClientIdentity(client_id): ClientIdentity,
) -> Json<ApiResponse<RateLimitStatus>> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let status = state.resolver.rate_limit_status(&client_id).await;

    let elapsed = start.elapsed().as_millis() as u64;
    Json(ApiResponse::success(status, request_id, elapsed))
}
