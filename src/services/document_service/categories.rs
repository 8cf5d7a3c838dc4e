use super::DocumentService;
use crate::api::error::AppError;
use crate::models::{Category, NewCategory};

impl DocumentService {
    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.store.list_categories().await?)
    }

    /// Fails with a conflict when the name is already taken.
    pub async fn create_category(&self, category: NewCategory) -> Result<Category, AppError> {
        let name = category.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest(
                "Category name cannot be empty".to_string(),
            ));
        }

        let created = self
            .store
            .create_category(NewCategory { name, ..category })
            .await?;
        tracing::info!("🏷️  Created category {}", created.name);
        Ok(created)
    }

    /// Documents filed under the category keep their category name.
    pub async fn delete_category(&self, id: &str) -> Result<(), AppError> {
        if self.store.delete_category(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Category not found".to_string()))
        }
    }
}
