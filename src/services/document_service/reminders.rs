use super::DocumentService;
use crate::api::error::AppError;
use crate::models::{NewReminder, Reminder};
use chrono::{DateTime, Utc};

impl DocumentService {
    pub async fn document_reminders(
        &self,
        user_id: &str,
        document_id: &str,
    ) -> Result<Vec<Reminder>, AppError> {
        // Not-found for documents of other users rather than an empty list.
        self.get_document(user_id, document_id).await?;
        Ok(self
            .store
            .get_document_reminders(document_id, user_id)
            .await?)
    }

    pub async fn active_reminders(&self, user_id: &str) -> Result<Vec<Reminder>, AppError> {
        Ok(self.store.get_active_reminders(user_id).await?)
    }

    pub async fn upcoming_reminders(
        &self,
        user_id: &str,
        days: i64,
    ) -> Result<Vec<Reminder>, AppError> {
        Ok(self.store.get_upcoming_reminders(user_id, days).await?)
    }

    /// Creates a user-defined reminder for one of the user's documents.
    pub async fn create_reminder(
        &self,
        user_id: &str,
        document_id: &str,
        reminder_date: DateTime<Utc>,
        message: &str,
    ) -> Result<Reminder, AppError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::BadRequest(
                "Reminder message cannot be empty".to_string(),
            ));
        }
        if reminder_date <= Utc::now() {
            return Err(AppError::BadRequest(
                "Reminder date must be in the future".to_string(),
            ));
        }

        self.get_document(user_id, document_id).await?;

        let reminder = self
            .store
            .create_reminder(NewReminder {
                user_id: user_id.to_string(),
                document_id: document_id.to_string(),
                reminder_date,
                message: message.to_string(),
            })
            .await?;

        tracing::info!(
            document_id = %document_id,
            reminder_id = %reminder.id,
            "⏰ Manual reminder created"
        );
        Ok(reminder)
    }

    pub async fn dismiss_reminder(&self, user_id: &str, id: &str) -> Result<Reminder, AppError> {
        self.store
            .set_reminder_active(id, user_id, false)
            .await?
            .ok_or_else(|| AppError::NotFound("Reminder not found".to_string()))
    }
}
