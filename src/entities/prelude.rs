pub use super::categories::Entity as Categories;
pub use super::documents::Entity as Documents;
pub use super::reminders::Entity as Reminders;
