use crate::api::error::AppError;
use crate::models::Document;
use crate::services::document_service::IngestRequest;
use crate::utils::auth::Claims;
use crate::utils::validation::parse_tags;
use axum::{
    Extension, Json,
    extract::{Multipart, State},
};
use chrono::NaiveDate;

#[utoipa::path(
    post,
    path = "/api/documents",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "Fields: file, category, expiryDate (YYYY-MM-DD), tags (comma separated)"
    ),
    responses(
        (status = 200, description = "Document stored", body = Document),
        (status = 400, description = "Invalid upload"),
        (status = 401, description = "Unauthorized"),
        (status = 413, description = "File too large")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "documents"
)]
pub async fn upload_document(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<Document>, AppError> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut category: Option<String> = None;
    let mut expiry_date: Option<NaiveDate> = None;
    let mut tags: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        let err_msg = e.to_string();
        if err_msg.contains("length limit exceeded") {
            AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
        } else {
            AppError::BadRequest(err_msg)
        }
    })? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                let original_filename = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((original_filename, content_type, bytes.to_vec()));
            }
            "category" => {
                let text = field.text().await.unwrap_or_default();
                if !text.trim().is_empty() {
                    category = Some(text);
                }
            }
            "expiryDate" => {
                let text = field.text().await.unwrap_or_default();
                let text = text.trim();
                if !text.is_empty() {
                    expiry_date = Some(NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(
                        |_| AppError::BadRequest("expiryDate must be YYYY-MM-DD".to_string()),
                    )?);
                }
            }
            "tags" => {
                let text = field.text().await.unwrap_or_default();
                tags = parse_tags(&text);
            }
            _ => {}
        }
    }

    let (original_filename, mime_type, bytes) =
        file.ok_or(AppError::BadRequest("No file provided".to_string()))?;

    let document = state
        .document_service
        .ingest(IngestRequest {
            user_id: claims.sub,
            original_filename,
            mime_type,
            bytes,
            category,
            expiry_date,
            tags,
        })
        .await?;

    Ok(Json(document))
}
