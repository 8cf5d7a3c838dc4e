use crate::api::error::AppError;
use crate::api::handlers::documents::types::CreateCategoryRequest;
use crate::models::{Category, NewCategory};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories", body = Vec<Category>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.document_service.list_categories().await?))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = Category),
        (status = 400, description = "Invalid category"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Name already taken")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<crate::AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    req.validate()?;

    let category = state
        .document_service
        .create_category(NewCategory {
            name: req.name,
            icon: req.icon.unwrap_or_else(|| "folder".to_string()),
            color: req.color.unwrap_or_else(|| "#6B7280".to_string()),
            description: req.description,
        })
        .await?;
    Ok(Json(category))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.document_service.delete_category(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
