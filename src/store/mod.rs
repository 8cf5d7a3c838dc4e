//! Persistence for documents, reminders and categories.
//!
//! [`DocumentStore`] is the only way the services touch stored records. Two
//! implementations exist: [`memory::MemoryStore`] for tests and local runs,
//! and [`database::DatabaseStore`] backed by sea-orm for SQLite/Postgres.
//!
//! Every call is independently atomic. `delete_document` removes the
//! document and all of its reminders as one unit.

pub mod database;
pub mod memory;

use crate::models::{
    Category, Document, DocumentPatch, MAX_WINDOW_DAYS, NewCategory, NewDocument, NewReminder,
    Reminder,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use thiserror::Error;

pub use database::DatabaseStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(&self, document: NewDocument) -> Result<Document, StoreError>;

    /// Returns `None` when the document does not exist or belongs to another
    /// user.
    async fn get_document(&self, id: &str, user_id: &str)
    -> Result<Option<Document>, StoreError>;

    async fn update_document(
        &self,
        id: &str,
        user_id: &str,
        patch: DocumentPatch,
    ) -> Result<Option<Document>, StoreError>;

    /// Sets the expiry date only if the document has none yet. Returns
    /// `true` when this call made the change; concurrent callers racing on
    /// the same document see at most one `true`.
    async fn set_expiry_if_absent(
        &self,
        id: &str,
        user_id: &str,
        expiry_date: NaiveDate,
    ) -> Result<bool, StoreError>;

    /// Deletes the document and every reminder referencing it.
    async fn delete_document(&self, id: &str, user_id: &str) -> Result<bool, StoreError>;

    /// All documents of a user, newest first.
    async fn list_documents(&self, user_id: &str) -> Result<Vec<Document>, StoreError>;

    async fn get_documents_by_category(
        &self,
        user_id: &str,
        category: &str,
    ) -> Result<Vec<Document>, StoreError>;

    async fn search_documents(
        &self,
        user_id: &str,
        query: &str,
    ) -> Result<Vec<Document>, StoreError>;

    /// Documents whose expiry date falls within `[from, to]`, soonest first.
    async fn get_expiring_documents(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Document>, StoreError>;

    async fn create_reminder(&self, reminder: NewReminder) -> Result<Reminder, StoreError>;

    async fn get_document_reminders(
        &self,
        document_id: &str,
        user_id: &str,
    ) -> Result<Vec<Reminder>, StoreError>;

    /// Active reminders due between `now` and `now + days`, soonest first.
    async fn get_upcoming_reminders(
        &self,
        user_id: &str,
        days: i64,
    ) -> Result<Vec<Reminder>, StoreError>;

    async fn get_active_reminders(&self, user_id: &str) -> Result<Vec<Reminder>, StoreError>;

    async fn set_reminder_active(
        &self,
        id: &str,
        user_id: &str,
        is_active: bool,
    ) -> Result<Option<Reminder>, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the name is taken.
    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError>;

    /// Documents keep their category name when a category is deleted.
    async fn delete_category(&self, id: &str) -> Result<bool, StoreError>;

    async fn ping(&self) -> bool;
}

/// Case-insensitive match against filename, category and tags.
pub(crate) fn matches_query(document: &Document, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    document.original_filename.to_lowercase().contains(&query)
        || document.category.to_lowercase().contains(&query)
        || document
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&query))
}

/// Window used by upcoming-reminder queries.
pub(crate) fn reminder_window(days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let now = Utc::now();
    let to = TimeDelta::try_days(days.clamp(0, MAX_WINDOW_DAYS))
        .and_then(|span| now.checked_add_signed(span))
        .unwrap_or(now);
    (now, to)
}
