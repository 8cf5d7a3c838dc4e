use crate::api::error::AppError;
use crate::api::handlers::documents::types::{CreateReminderRequest, DaysQuery};
use crate::models::Reminder;
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/reminders",
    responses(
        (status = 200, description = "Active reminders, soonest first", body = Vec<Reminder>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "reminders"
)]
pub async fn list_active_reminders(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    let reminders = state.document_service.active_reminders(&claims.sub).await?;
    Ok(Json(reminders))
}

#[utoipa::path(
    get,
    path = "/api/reminders/upcoming",
    params(DaysQuery),
    responses(
        (status = 200, description = "Active reminders due within the window", body = Vec<Reminder>),
        (status = 400, description = "Invalid window"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "reminders"
)]
pub async fn upcoming_reminders(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    query.validate()?;
    let reminders = state
        .document_service
        .upcoming_reminders(&claims.sub, query.days.unwrap_or(30))
        .await?;
    Ok(Json(reminders))
}

#[utoipa::path(
    post,
    path = "/api/reminders",
    request_body = CreateReminderRequest,
    responses(
        (status = 200, description = "Reminder created", body = Reminder),
        (status = 400, description = "Invalid reminder"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Document not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "reminders"
)]
pub async fn create_reminder(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateReminderRequest>,
) -> Result<Json<Reminder>, AppError> {
    req.validate()?;

    let reminder = state
        .document_service
        .create_reminder(&claims.sub, &req.document_id, req.reminder_date, &req.message)
        .await?;
    Ok(Json(reminder))
}

#[utoipa::path(
    post,
    path = "/api/reminders/{id}/dismiss",
    params(
        ("id" = String, Path, description = "Reminder ID")
    ),
    responses(
        (status = 200, description = "Reminder dismissed", body = Reminder),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Reminder not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "reminders"
)]
pub async fn dismiss_reminder(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Reminder>, AppError> {
    let reminder = state
        .document_service
        .dismiss_reminder(&claims.sub, &id)
        .await?;
    Ok(Json(reminder))
}
