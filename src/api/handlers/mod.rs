pub mod categories;
pub mod documents;
pub mod health;
pub mod reminders;
pub mod stats;
