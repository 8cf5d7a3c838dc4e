//! Document lifecycle: ingestion, updates, deletion, reminders, categories
//! and dashboard counters, on top of a [`DocumentStore`] and a
//! [`StorageService`].

use crate::services::{scanner::ExpiryScanner, storage::StorageService};
use crate::store::DocumentStore;
use std::sync::Arc;

pub mod categories;
pub mod ingest;
pub mod manage;
pub mod reminders;
pub mod types;

pub use types::IngestRequest;

/// A scanned expiry date is accepted only above this confidence.
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn StorageService>,
    scanner: Arc<ExpiryScanner>,
    max_file_size: usize,
}

impl DocumentService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn StorageService>,
        scanner: Arc<ExpiryScanner>,
        max_file_size: usize,
    ) -> Self {
        Self {
            store,
            storage,
            scanner,
            max_file_size,
        }
    }

    pub fn scanner(&self) -> &ExpiryScanner {
        &self.scanner
    }
}
