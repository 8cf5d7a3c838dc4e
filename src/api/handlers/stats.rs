use crate::api::error::AppError;
use crate::models::DocumentStats;
use crate::utils::auth::Claims;
use axum::{Extension, Json, extract::State};

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Dashboard counters", body = DocumentStats),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "documents"
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DocumentStats>, AppError> {
    Ok(Json(state.document_service.stats(&claims.sub).await?))
}
