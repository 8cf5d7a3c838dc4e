pub mod prelude;

pub mod categories;
pub mod documents;
pub mod reminders;
