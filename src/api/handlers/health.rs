use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub scanner: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_status = if state.store.ping().await {
        "connected"
    } else {
        "disconnected"
    };

    let scanner = state.document_service.scanner();
    let scanner_status = if !scanner.is_enabled() {
        "disabled"
    } else if scanner.health_check().await {
        "ready"
    } else {
        "unconfigured"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        database: db_status.to_string(),
        scanner: scanner_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
