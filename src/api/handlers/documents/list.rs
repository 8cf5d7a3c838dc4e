use crate::api::error::AppError;
use crate::models::Document;
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use super::types::*;
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/documents",
    params(ListDocumentsQuery),
    responses(
        (status = 200, description = "Documents of the caller, newest first", body = Vec<Document>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "documents"
)]
pub async fn list_documents(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    let documents = state
        .document_service
        .list_documents(
            &claims.sub,
            query.category.as_deref(),
            query.search.as_deref(),
        )
        .await?;
    Ok(Json(documents))
}

#[utoipa::path(
    get,
    path = "/api/documents/expiring",
    params(DaysQuery),
    responses(
        (status = 200, description = "Documents expiring within the window, soonest first", body = Vec<Document>),
        (status = 400, description = "Invalid window"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "documents"
)]
pub async fn expiring_documents(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    query.validate()?;
    let days = query.days.unwrap_or(90);
    let documents = state
        .document_service
        .expiring_documents(&claims.sub, days)
        .await?;
    Ok(Json(documents))
}
