//! Health Check Commands
//!
//! Liveness and readiness of the backend services.

use crate::models::response::{CommandResponse, HealthResponse, StatusResponse};
use crate::state::AppState;

/// Liveness: the process is up
pub async fn get_health() -> CommandResponse<HealthResponse> {
    CommandResponse::ok(HealthResponse::default())
}

/// Readiness of the database and the remote analysis path
pub async fn get_status(state: &AppState) -> CommandResponse<StatusResponse> {
    CommandResponse::ok(state.suggestions().status().await)
}
