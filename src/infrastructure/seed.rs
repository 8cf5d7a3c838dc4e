use crate::models::{BUILTIN_CATEGORIES, NewCategory};
use crate::store::{DocumentStore, StoreError};
use tracing::info;

/// Inserts the built-in categories that are missing. Safe to run on every
/// start.
pub async fn seed_default_categories(store: &dyn DocumentStore) -> anyhow::Result<usize> {
    info!("🌱 Seeding default categories...");

    let mut created = 0;
    for (name, icon, color, description) in BUILTIN_CATEGORIES {
        if store.find_category_by_name(name).await?.is_some() {
            continue;
        }

        let category = NewCategory {
            name: name.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
            description: Some(description.to_string()),
        };

        match store.create_category(category).await {
            Ok(_) => created += 1,
            // Another instance seeded it first.
            Err(StoreError::Conflict(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    info!("✅ Seeding completed ({} new)", created);
    Ok(created)
}
