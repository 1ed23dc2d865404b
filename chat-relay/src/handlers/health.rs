use axum::Json;

use crate::dtos::HealthResponse;

pub const GREETING: &str = "Chat relay is running successfully.";

/// Liveness check. Never touches the model provider.
pub async fn home() -> Json<HealthResponse> {
    tracing::debug!("Root path accessed");

    Json(HealthResponse {
        status: "OK",
        message: GREETING,
    })
}
