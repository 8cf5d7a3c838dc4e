use super::DocumentService;
use crate::api::error::AppError;
use crate::models::{
    CategoryCount, Document, DocumentPatch, DocumentStats, MAX_WINDOW_DAYS,
    is_plausible_expiry,
};
use crate::services::reminder_scheduler::schedule_expiry_reminders;
use chrono::{Duration, TimeDelta, Utc};
use std::collections::BTreeMap;

/// Window used for the "expiring soon" dashboard counter.
pub const EXPIRING_SOON_DAYS: i64 = 30;

fn not_found() -> AppError {
    AppError::NotFound("Document not found".to_string())
}

impl DocumentService {
    pub async fn get_document(&self, user_id: &str, id: &str) -> Result<Document, AppError> {
        self.store
            .get_document(id, user_id)
            .await?
            .ok_or_else(not_found)
    }

    /// Lists a user's documents. A search query takes precedence; a category
    /// further narrows the result.
    pub async fn list_documents(
        &self,
        user_id: &str,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Document>, AppError> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        let documents = match (search, category) {
            (Some(query), category) => {
                let found = self.store.search_documents(user_id, query).await?;
                match category {
                    Some(c) => found.into_iter().filter(|d| d.category == c).collect(),
                    None => found,
                }
            }
            (None, Some(c)) => self.store.get_documents_by_category(user_id, c).await?,
            (None, None) => self.store.list_documents(user_id).await?,
        };
        Ok(documents)
    }

    /// Applies a partial update. The first time a document gets an expiry
    /// date its reminders are scheduled; later corrections leave existing
    /// reminders untouched.
    pub async fn update_document(
        &self,
        user_id: &str,
        id: &str,
        mut patch: DocumentPatch,
    ) -> Result<Document, AppError> {
        if patch.expiry_date.is_some_and(|d| !is_plausible_expiry(d)) {
            return Err(AppError::BadRequest(
                "expiryDate must fall between 1900 and 9999".to_string(),
            ));
        }

        self.get_document(user_id, id).await?;

        // Claiming the first expiry is atomic in the store, so only one
        // caller schedules.
        let acquired = match patch.expiry_date {
            Some(expiry) => self.store.set_expiry_if_absent(id, user_id, expiry).await?,
            None => false,
        };
        if acquired {
            patch.expiry_date = None;
        }

        let updated = self
            .store
            .update_document(id, user_id, patch)
            .await?
            .ok_or_else(not_found)?;

        if acquired {
            schedule_expiry_reminders(self.store.as_ref(), &updated).await;
        }
        Ok(updated)
    }

    /// Removes the document, its reminders and its stored bytes.
    pub async fn delete_document(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        let document = self.get_document(user_id, id).await?;

        if !self.store.delete_document(id, user_id).await? {
            return Err(not_found());
        }

        if let Err(e) = self.storage.delete_file(&document.filename).await {
            tracing::warn!(
                document_id = %id,
                "⚠️  Document deleted but stored file {} remains: {}",
                document.filename,
                e
            );
        }

        tracing::info!(document_id = %id, "🗑️  Deleted document");
        Ok(())
    }

    pub async fn download_document(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<(Document, Vec<u8>), AppError> {
        let document = self.get_document(user_id, id).await?;
        let bytes = self
            .storage
            .get_file(&document.filename)
            .await
            .map_err(|e| AppError::Internal(format!("Storage error: {}", e)))?;
        Ok((document, bytes))
    }

    /// Documents expiring between today and `days` from now.
    pub async fn expiring_documents(
        &self,
        user_id: &str,
        days: i64,
    ) -> Result<Vec<Document>, AppError> {
        let today = Utc::now().date_naive();
        let until = TimeDelta::try_days(days.clamp(0, MAX_WINDOW_DAYS))
            .and_then(|span| today.checked_add_signed(span))
            .unwrap_or(today);
        Ok(self
            .store
            .get_expiring_documents(user_id, today, until)
            .await?)
    }

    pub async fn stats(&self, user_id: &str) -> Result<DocumentStats, AppError> {
        let documents = self.store.list_documents(user_id).await?;
        let active_reminders = self.store.get_active_reminders(user_id).await?.len() as u64;

        let today = Utc::now().date_naive();
        let soon = today + Duration::days(EXPIRING_SOON_DAYS);

        let mut by_category: BTreeMap<&str, u64> = BTreeMap::new();
        let mut expiring_soon = 0;
        for document in &documents {
            *by_category.entry(document.category.as_str()).or_default() += 1;
            if document
                .expiry_date
                .is_some_and(|d| d >= today && d <= soon)
            {
                expiring_soon += 1;
            }
        }

        Ok(DocumentStats {
            total_documents: documents.len() as u64,
            by_category: by_category
                .into_iter()
                .map(|(category, count)| CategoryCount {
                    category: category.to_string(),
                    count,
                })
                .collect(),
            expiring_soon,
            active_reminders,
        })
    }
}
