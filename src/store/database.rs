use super::{DocumentStore, StoreError, matches_query, reminder_window};
use crate::entities::{prelude::*, *};
use crate::models::{
    Category, Document, DocumentPatch, NewCategory, NewDocument, NewReminder, Reminder,
    date_to_timestamp,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde_json::{Map, Value, json};

/// [`DocumentStore`] backed by a sea-orm connection (SQLite or Postgres).
#[derive(Clone)]
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<documents::Model> for Document {
    fn from(model: documents::Model) -> Self {
        let tags = serde_json::from_value::<Vec<String>>(model.tags).unwrap_or_default();
        let metadata = match model.metadata {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Document {
            id: model.id,
            user_id: model.user_id,
            filename: model.filename,
            original_filename: model.original_filename,
            mime_type: model.mime_type,
            size: model.size,
            category: model.category,
            tags,
            metadata,
            expiry_date: model.expiry_date.map(|ts| ts.date_naive()),
            is_encrypted: model.is_encrypted,
            uploaded_at: model.uploaded_at,
        }
    }
}

impl From<reminders::Model> for Reminder {
    fn from(model: reminders::Model) -> Self {
        Reminder {
            id: model.id,
            user_id: model.user_id,
            document_id: model.document_id,
            reminder_date: model.reminder_date,
            message: model.message,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Category {
            id: model.id,
            name: model.name,
            icon: model.icon,
            color: model.color,
            description: model.description,
        }
    }
}

#[async_trait]
impl DocumentStore for DatabaseStore {
    async fn create_document(&self, document: NewDocument) -> Result<Document, StoreError> {
        let document = document.into_document();

        let model = documents::ActiveModel {
            id: Set(document.id.clone()),
            user_id: Set(document.user_id.clone()),
            filename: Set(document.filename.clone()),
            original_filename: Set(document.original_filename.clone()),
            mime_type: Set(document.mime_type.clone()),
            size: Set(document.size),
            category: Set(document.category.clone()),
            tags: Set(json!(document.tags)),
            metadata: Set(Value::Object(document.metadata.clone())),
            expiry_date: Set(document.expiry_date.map(date_to_timestamp)),
            is_encrypted: Set(document.is_encrypted),
            uploaded_at: Set(document.uploaded_at),
        };

        let inserted = model.insert(&self.db).await?;
        Ok(inserted.into())
    }

    async fn get_document(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let found = Documents::find_by_id(id)
            .filter(documents::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(found.map(Into::into))
    }

    async fn update_document(
        &self,
        id: &str,
        user_id: &str,
        patch: DocumentPatch,
    ) -> Result<Option<Document>, StoreError> {
        let Some(existing) = Documents::find_by_id(id)
            .filter(documents::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        if patch.is_empty() {
            return Ok(Some(existing.into()));
        }

        let mut active: documents::ActiveModel = existing.into();
        if let Some(category) = patch.category {
            active.category = Set(category);
        }
        if let Some(tags) = patch.tags {
            active.tags = Set(json!(tags));
        }
        if let Some(expiry_date) = patch.expiry_date {
            active.expiry_date = Set(Some(date_to_timestamp(expiry_date)));
        }
        if let Some(metadata) = patch.metadata {
            active.metadata = Set(Value::Object(metadata));
        }

        let updated = active.update(&self.db).await?;
        Ok(Some(updated.into()))
    }

    async fn set_expiry_if_absent(
        &self,
        id: &str,
        user_id: &str,
        expiry_date: NaiveDate,
    ) -> Result<bool, StoreError> {
        let result = Documents::update_many()
            .col_expr(
                documents::Column::ExpiryDate,
                Expr::value(date_to_timestamp(expiry_date)),
            )
            .filter(documents::Column::Id.eq(id))
            .filter(documents::Column::UserId.eq(user_id))
            .filter(documents::Column::ExpiryDate.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn delete_document(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
        let txn = self.db.begin().await?;

        let Some(document) = Documents::find_by_id(id)
            .filter(documents::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            return Ok(false);
        };

        // SQLite only enforces ON DELETE CASCADE with foreign_keys enabled,
        // so reminders are removed explicitly inside the same transaction.
        let removed = Reminders::delete_many()
            .filter(reminders::Column::DocumentId.eq(id))
            .exec(&txn)
            .await?;
        document.delete(&txn).await?;
        txn.commit().await?;

        tracing::debug!(
            "Deleted document {} with {} reminder(s)",
            id,
            removed.rows_affected
        );
        Ok(true)
    }

    async fn list_documents(&self, user_id: &str) -> Result<Vec<Document>, StoreError> {
        let rows = Documents::find()
            .filter(documents::Column::UserId.eq(user_id))
            .order_by_desc(documents::Column::UploadedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_documents_by_category(
        &self,
        user_id: &str,
        category: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = Documents::find()
            .filter(documents::Column::UserId.eq(user_id))
            .filter(documents::Column::Category.eq(category))
            .order_by_desc(documents::Column::UploadedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search_documents(
        &self,
        user_id: &str,
        query: &str,
    ) -> Result<Vec<Document>, StoreError> {
        // Tags live in a JSON column, so matching happens after loading the
        // user's documents.
        let documents = self.list_documents(user_id).await?;
        Ok(documents
            .into_iter()
            .filter(|d| matches_query(d, query))
            .collect())
    }

    async fn get_expiring_documents(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = Documents::find()
            .filter(documents::Column::UserId.eq(user_id))
            .filter(documents::Column::ExpiryDate.gte(date_to_timestamp(from)))
            .filter(documents::Column::ExpiryDate.lte(date_to_timestamp(to)))
            .order_by_asc(documents::Column::ExpiryDate)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_reminder(&self, reminder: NewReminder) -> Result<Reminder, StoreError> {
        let reminder = reminder.into_reminder();

        let model = reminders::ActiveModel {
            id: Set(reminder.id.clone()),
            user_id: Set(reminder.user_id.clone()),
            document_id: Set(reminder.document_id.clone()),
            reminder_date: Set(reminder.reminder_date),
            message: Set(reminder.message.clone()),
            is_active: Set(reminder.is_active),
            created_at: Set(reminder.created_at),
        };

        let inserted = model.insert(&self.db).await?;
        Ok(inserted.into())
    }

    async fn get_document_reminders(
        &self,
        document_id: &str,
        user_id: &str,
    ) -> Result<Vec<Reminder>, StoreError> {
        let rows = Reminders::find()
            .filter(reminders::Column::DocumentId.eq(document_id))
            .filter(reminders::Column::UserId.eq(user_id))
            .order_by_asc(reminders::Column::ReminderDate)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_upcoming_reminders(
        &self,
        user_id: &str,
        days: i64,
    ) -> Result<Vec<Reminder>, StoreError> {
        let (from, to) = reminder_window(days);
        let rows = Reminders::find()
            .filter(reminders::Column::UserId.eq(user_id))
            .filter(reminders::Column::IsActive.eq(true))
            .filter(reminders::Column::ReminderDate.gte(from))
            .filter(reminders::Column::ReminderDate.lte(to))
            .order_by_asc(reminders::Column::ReminderDate)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_active_reminders(&self, user_id: &str) -> Result<Vec<Reminder>, StoreError> {
        let rows = Reminders::find()
            .filter(reminders::Column::UserId.eq(user_id))
            .filter(reminders::Column::IsActive.eq(true))
            .order_by_asc(reminders::Column::ReminderDate)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn set_reminder_active(
        &self,
        id: &str,
        user_id: &str,
        is_active: bool,
    ) -> Result<Option<Reminder>, StoreError> {
        let Some(existing) = Reminders::find_by_id(id)
            .filter(reminders::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: reminders::ActiveModel = existing.into();
        active.is_active = Set(is_active);
        let updated = active.update(&self.db).await?;
        Ok(Some(updated.into()))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = Categories::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let found = Categories::find()
            .filter(categories::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(found.map(Into::into))
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        if self.find_category_by_name(&category.name).await?.is_some() {
            return Err(StoreError::Conflict(format!(
                "category '{}' already exists",
                category.name
            )));
        }

        let category = category.into_category();
        let model = categories::ActiveModel {
            id: Set(category.id.clone()),
            name: Set(category.name.clone()),
            icon: Set(category.icon.clone()),
            color: Set(category.color.clone()),
            description: Set(category.description.clone()),
        };

        let inserted = model.insert(&self.db).await?;
        Ok(inserted.into())
    }

    async fn delete_category(&self, id: &str) -> Result<bool, StoreError> {
        let result = Categories::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn ping(&self) -> bool {
        self.db.ping().await.is_ok()
    }
}
