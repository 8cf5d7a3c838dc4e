use super::{DocumentStore, StoreError, matches_query, reminder_window};
use crate::models::{
    BUILTIN_CATEGORIES, Category, Document, DocumentPatch, NewCategory, NewDocument, NewReminder,
    Reminder,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    documents: HashMap<String, Document>,
    reminders: HashMap<String, Reminder>,
    categories: HashMap<String, Category>,
}

/// In-memory [`DocumentStore`].
///
/// All three tables live behind one lock, so a cascade delete is observed
/// either fully applied or not at all.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the built-in categories.
    pub fn with_builtin_categories() -> Self {
        let mut tables = Tables::default();
        for (name, icon, color, description) in BUILTIN_CATEGORIES {
            let category = NewCategory {
                name: name.to_string(),
                icon: icon.to_string(),
                color: color.to_string(),
                description: Some(description.to_string()),
            }
            .into_category();
            tables.categories.insert(category.id.clone(), category);
        }
        Self {
            tables: RwLock::new(tables),
        }
    }
}

fn newest_first(mut documents: Vec<Document>) -> Vec<Document> {
    documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    documents
}

fn soonest_first(mut reminders: Vec<Reminder>) -> Vec<Reminder> {
    reminders.sort_by(|a, b| a.reminder_date.cmp(&b.reminder_date));
    reminders
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_document(&self, document: NewDocument) -> Result<Document, StoreError> {
        let document = document.into_document();
        let mut tables = self.tables.write().await;
        tables
            .documents
            .insert(document.id.clone(), document.clone());
        Ok(document)
    }

    async fn get_document(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .documents
            .get(id)
            .filter(|d| d.user_id == user_id)
            .cloned())
    }

    async fn update_document(
        &self,
        id: &str,
        user_id: &str,
        patch: DocumentPatch,
    ) -> Result<Option<Document>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(document) = tables
            .documents
            .get_mut(id)
            .filter(|d| d.user_id == user_id)
        else {
            return Ok(None);
        };

        patch.apply(document);
        Ok(Some(document.clone()))
    }

    async fn set_expiry_if_absent(
        &self,
        id: &str,
        user_id: &str,
        expiry_date: NaiveDate,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables
            .documents
            .get_mut(id)
            .filter(|d| d.user_id == user_id && d.expiry_date.is_none())
        {
            Some(document) => {
                document.expiry_date = Some(expiry_date);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_document(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .documents
            .get(id)
            .is_some_and(|d| d.user_id == user_id);
        if !owned {
            return Ok(false);
        }

        tables.documents.remove(id);
        tables.reminders.retain(|_, r| r.document_id != id);
        Ok(true)
    }

    async fn list_documents(&self, user_id: &str) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .documents
                .values()
                .filter(|d| d.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn get_documents_by_category(
        &self,
        user_id: &str,
        category: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .documents
                .values()
                .filter(|d| d.user_id == user_id && d.category == category)
                .cloned()
                .collect(),
        ))
    }

    async fn search_documents(
        &self,
        user_id: &str,
        query: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .documents
                .values()
                .filter(|d| d.user_id == user_id && matches_query(d, query))
                .cloned()
                .collect(),
        ))
    }

    async fn get_expiring_documents(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.read().await;
        let mut documents: Vec<Document> = tables
            .documents
            .values()
            .filter(|d| d.user_id == user_id)
            .filter(|d| d.expiry_date.is_some_and(|e| e >= from && e <= to))
            .cloned()
            .collect();
        documents.sort_by_key(|d| d.expiry_date);
        Ok(documents)
    }

    async fn create_reminder(&self, reminder: NewReminder) -> Result<Reminder, StoreError> {
        let mut tables = self.tables.write().await;
        // Mirrors the foreign key of the SQL backend.
        if !tables.documents.contains_key(&reminder.document_id) {
            return Err(StoreError::Conflict(format!(
                "document {} does not exist",
                reminder.document_id
            )));
        }

        let reminder = reminder.into_reminder();
        tables
            .reminders
            .insert(reminder.id.clone(), reminder.clone());
        Ok(reminder)
    }

    async fn get_document_reminders(
        &self,
        document_id: &str,
        user_id: &str,
    ) -> Result<Vec<Reminder>, StoreError> {
        let tables = self.tables.read().await;
        Ok(soonest_first(
            tables
                .reminders
                .values()
                .filter(|r| r.document_id == document_id && r.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn get_upcoming_reminders(
        &self,
        user_id: &str,
        days: i64,
    ) -> Result<Vec<Reminder>, StoreError> {
        let (from, to) = reminder_window(days);
        let tables = self.tables.read().await;
        Ok(soonest_first(
            tables
                .reminders
                .values()
                .filter(|r| r.user_id == user_id && r.is_active)
                .filter(|r| r.reminder_date >= from && r.reminder_date <= to)
                .cloned()
                .collect(),
        ))
    }

    async fn get_active_reminders(&self, user_id: &str) -> Result<Vec<Reminder>, StoreError> {
        let tables = self.tables.read().await;
        Ok(soonest_first(
            tables
                .reminders
                .values()
                .filter(|r| r.user_id == user_id && r.is_active)
                .cloned()
                .collect(),
        ))
    }

    async fn set_reminder_active(
        &self,
        id: &str,
        user_id: &str,
        is_active: bool,
    ) -> Result<Option<Reminder>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(reminder) = tables
            .reminders
            .get_mut(id)
            .filter(|r| r.user_id == user_id)
        else {
            return Ok(None);
        };

        reminder.is_active = is_active;
        Ok(Some(reminder.clone()))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.categories.values().any(|c| c.name == category.name) {
            return Err(StoreError::Conflict(format!(
                "category '{}' already exists",
                category.name
            )));
        }

        let category = category.into_category();
        tables
            .categories
            .insert(category.id.clone(), category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.categories.remove(id).is_some())
    }

    async fn ping(&self) -> bool {
        true
    }
}
