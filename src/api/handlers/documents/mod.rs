pub mod list;
pub mod manage;
pub mod types;
pub mod upload;

pub use types::*;

pub use list::{expiring_documents, list_documents};
pub use manage::{
    delete_document, document_reminders, download_document, get_document, update_document,
};
pub use upload::upload_document;
