//! Health check endpoint for monitoring and readiness probes

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::storage::check_connection;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Returns 200 when the token store answers, 503 otherwise.
pub async fn health_handler(
    State(state): State<ApiState>,
) -> Result<(StatusCode, Json<HealthResponse>), ApiError> {
    check_connection(&state.pool)
        .await
        .map_err(|_| ApiError::service_unavailable("Database is unreachable"))?;

    Ok((
        StatusCode::OK,
        Json(HealthResponse { status: "ok".to_string(), version: crate::VERSION.to_string() }),
    ))
}
