use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Deserialize, IntoParams)]
pub struct ListDocumentsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Deserialize, IntoParams, Validate)]
pub struct DaysQuery {
    /// Window size in days (0-3650)
    #[validate(range(min = 0, max = 3650, message = "days must be between 0 and 3650"))]
    pub days: Option<i64>,
}

#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    #[validate(length(min = 1, max = 100, message = "Category must be 1-100 characters"))]
    pub category: Option<String>,
    #[validate(length(max = 50, message = "At most 50 tags"))]
    pub tags: Option<Vec<String>>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReminderRequest {
    #[validate(length(min = 1, message = "Document id is required"))]
    pub document_id: String,
    pub reminder_date: DateTime<Utc>,
    #[validate(length(min = 1, max = 500, message = "Message must be 1-500 characters"))]
    pub message: String,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub icon: Option<String>,
    #[validate(length(min = 4, max = 9, message = "Color must be a hex code"))]
    pub color: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}
