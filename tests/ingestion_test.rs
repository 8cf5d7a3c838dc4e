use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use doc_vault::api::error::AppError;
use doc_vault::models::{
    Category, Document, DocumentPatch, IDENTITY_DOCUMENTS, NewCategory, NewDocument, NewReminder,
    RECEIPTS, Reminder,
};
use doc_vault::services::document_service::{DocumentService, IngestRequest};
use doc_vault::services::scanner::{ExpiryScanner, RawExtraction, ScannerError, VisionClient};
use doc_vault::services::storage::{LocalStorageService, StorageService};
use doc_vault::store::{DocumentStore, MemoryStore, StoreError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

const JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01,
];
const USER: &str = "user-1";

struct MockVision {
    answer: RawExtraction,
    calls: AtomicUsize,
}

impl MockVision {
    fn answering(expiry: NaiveDate, confidence: f64) -> Arc<Self> {
        Arc::new(Self {
            answer: RawExtraction {
                expiry_date: Some(expiry.format("%Y-%m-%d").to_string()),
                document_type: Some("passport".to_string()),
                confidence: Some(confidence),
                document_number: Some("123456789".to_string()),
            },
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionClient for MockVision {
    async fn extract_expiry(
        &self,
        _image_base64: &str,
        _mime_type: &str,
    ) -> Result<RawExtraction, ScannerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Store that refuses to create reminders; everything else is delegated.
struct NoReminderStore {
    inner: MemoryStore,
}

#[async_trait]
impl DocumentStore for NoReminderStore {
    async fn create_document(&self, document: NewDocument) -> Result<Document, StoreError> {
        self.inner.create_document(document).await
    }
    async fn get_document(&self, id: &str, user_id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get_document(id, user_id).await
    }
    async fn update_document(
        &self,
        id: &str,
        user_id: &str,
        patch: DocumentPatch,
    ) -> Result<Option<Document>, StoreError> {
        self.inner.update_document(id, user_id, patch).await
    }
    async fn set_expiry_if_absent(
        &self,
        id: &str,
        user_id: &str,
        expiry_date: NaiveDate,
    ) -> Result<bool, StoreError> {
        self.inner.set_expiry_if_absent(id, user_id, expiry_date).await
    }
    async fn delete_document(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
        self.inner.delete_document(id, user_id).await
    }
    async fn list_documents(&self, user_id: &str) -> Result<Vec<Document>, StoreError> {
        self.inner.list_documents(user_id).await
    }
    async fn get_documents_by_category(
        &self,
        user_id: &str,
        category: &str,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.get_documents_by_category(user_id, category).await
    }
    async fn search_documents(&self, user_id: &str, query: &str) -> Result<Vec<Document>, StoreError> {
        self.inner.search_documents(user_id, query).await
    }
    async fn get_expiring_documents(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.get_expiring_documents(user_id, from, to).await
    }
    async fn create_reminder(&self, _reminder: NewReminder) -> Result<Reminder, StoreError> {
        Err(StoreError::Unavailable("reminders table locked".to_string()))
    }
    async fn get_document_reminders(
        &self,
        document_id: &str,
        user_id: &str,
    ) -> Result<Vec<Reminder>, StoreError> {
        self.inner.get_document_reminders(document_id, user_id).await
    }
    async fn get_upcoming_reminders(&self, user_id: &str, days: i64) -> Result<Vec<Reminder>, StoreError> {
        self.inner.get_upcoming_reminders(user_id, days).await
    }
    async fn get_active_reminders(&self, user_id: &str) -> Result<Vec<Reminder>, StoreError> {
        self.inner.get_active_reminders(user_id).await
    }
    async fn set_reminder_active(
        &self,
        id: &str,
        user_id: &str,
        is_active: bool,
    ) -> Result<Option<Reminder>, StoreError> {
        self.inner.set_reminder_active(id, user_id, is_active).await
    }
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.inner.list_categories().await
    }
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        self.inner.find_category_by_name(name).await
    }
    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        self.inner.create_category(category).await
    }
    async fn delete_category(&self, id: &str) -> Result<bool, StoreError> {
        self.inner.delete_category(id).await
    }
    async fn ping(&self) -> bool {
        true
    }
}

/// Store whose document writes always fail.
struct BrokenStore;

#[async_trait]
impl DocumentStore for BrokenStore {
    async fn create_document(&self, _document: NewDocument) -> Result<Document, StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }
    async fn get_document(&self, _id: &str, _user_id: &str) -> Result<Option<Document>, StoreError> {
        Ok(None)
    }
    async fn update_document(
        &self,
        _id: &str,
        _user_id: &str,
        _patch: DocumentPatch,
    ) -> Result<Option<Document>, StoreError> {
        Ok(None)
    }
    async fn set_expiry_if_absent(
        &self,
        _id: &str,
        _user_id: &str,
        _expiry_date: NaiveDate,
    ) -> Result<bool, StoreError> {
        Ok(false)
    }
    async fn delete_document(&self, _id: &str, _user_id: &str) -> Result<bool, StoreError> {
        Ok(false)
    }
    async fn list_documents(&self, _user_id: &str) -> Result<Vec<Document>, StoreError> {
        Ok(vec![])
    }
    async fn get_documents_by_category(
        &self,
        _user_id: &str,
        _category: &str,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(vec![])
    }
    async fn search_documents(&self, _user_id: &str, _query: &str) -> Result<Vec<Document>, StoreError> {
        Ok(vec![])
    }
    async fn get_expiring_documents(
        &self,
        _user_id: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(vec![])
    }
    async fn create_reminder(&self, _reminder: NewReminder) -> Result<Reminder, StoreError> {
        panic!("no reminder may be scheduled when the document write failed");
    }
    async fn get_document_reminders(
        &self,
        _document_id: &str,
        _user_id: &str,
    ) -> Result<Vec<Reminder>, StoreError> {
        Ok(vec![])
    }
    async fn get_upcoming_reminders(&self, _user_id: &str, _days: i64) -> Result<Vec<Reminder>, StoreError> {
        Ok(vec![])
    }
    async fn get_active_reminders(&self, _user_id: &str) -> Result<Vec<Reminder>, StoreError> {
        Ok(vec![])
    }
    async fn set_reminder_active(
        &self,
        _id: &str,
        _user_id: &str,
        _is_active: bool,
    ) -> Result<Option<Reminder>, StoreError> {
        Ok(None)
    }
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(vec![])
    }
    async fn find_category_by_name(&self, _name: &str) -> Result<Option<Category>, StoreError> {
        Ok(None)
    }
    async fn create_category(&self, _category: NewCategory) -> Result<Category, StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }
    async fn delete_category(&self, _id: &str) -> Result<bool, StoreError> {
        Ok(false)
    }
    async fn ping(&self) -> bool {
        false
    }
}

struct Harness {
    service: DocumentService,
    store: Arc<dyn DocumentStore>,
    storage: Arc<LocalStorageService>,
    vision: Arc<MockVision>,
    _dir: TempDir,
}

async fn harness_with(
    store: Arc<dyn DocumentStore>,
    vision: Arc<MockVision>,
    scanning_enabled: bool,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(LocalStorageService::new(dir.path()).await.unwrap());
    let scanner = Arc::new(ExpiryScanner::new(vision.clone(), scanning_enabled));
    let service = DocumentService::new(store.clone(), storage.clone(), scanner, 25 * 1024 * 1024);

    Harness {
        service,
        store,
        storage,
        vision,
        _dir: dir,
    }
}

async fn harness(vision: Arc<MockVision>, scanning_enabled: bool) -> Harness {
    harness_with(Arc::new(MemoryStore::new()), vision, scanning_enabled).await
}

fn upload(filename: &str) -> IngestRequest {
    IngestRequest {
        user_id: USER.to_string(),
        original_filename: filename.to_string(),
        mime_type: Some("image/jpeg".to_string()),
        bytes: JPEG.to_vec(),
        category: None,
        expiry_date: None,
        tags: vec![],
    }
}

fn days_from_today(days: i64) -> NaiveDate {
    (Utc::now() + Duration::days(days)).date_naive()
}

#[tokio::test]
async fn test_confident_scan_sets_expiry_and_schedules_reminders() {
    let expiry = days_from_today(400);
    let h = harness(MockVision::answering(expiry, 0.95), true).await;

    let doc = h.service.ingest(upload("passport_john.jpg")).await.unwrap();

    assert_eq!(doc.category, IDENTITY_DOCUMENTS);
    assert_eq!(doc.expiry_date, Some(expiry));
    assert_eq!(doc.metadata["scan"]["documentType"], "passport");
    assert_eq!(doc.metadata["scan"]["confidence"], 0.95);
    assert_eq!(h.vision.calls(), 1);

    let reminders = h.store.get_document_reminders(&doc.id, USER).await.unwrap();
    assert_eq!(reminders.len(), 3);
    assert!(reminders.iter().all(|r| r.is_active && r.reminder_date > Utc::now()));

    // The stored record matches what was returned.
    let stored = h.store.get_document(&doc.id, USER).await.unwrap().unwrap();
    assert_eq!(stored.expiry_date, Some(expiry));
    assert!(h.storage.file_exists(&doc.filename).await.unwrap());
}

#[tokio::test]
async fn test_low_confidence_scan_is_discarded() {
    let h = harness(MockVision::answering(days_from_today(400), 0.4), true).await;

    let doc = h.service.ingest(upload("passport_john.jpg")).await.unwrap();

    assert_eq!(doc.expiry_date, None);
    assert!(!doc.metadata.contains_key("scan"));
    assert_eq!(h.vision.calls(), 1);
    assert!(h.store.get_document_reminders(&doc.id, USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_confidence_exactly_at_threshold_is_discarded() {
    let h = harness(MockVision::answering(days_from_today(400), 0.7), true).await;

    let doc = h.service.ingest(upload("passport_john.jpg")).await.unwrap();

    assert_eq!(doc.expiry_date, None);
    assert_eq!(h.vision.calls(), 1);
}

#[tokio::test]
async fn test_disabled_scanning_never_calls_service() {
    let h = harness(MockVision::answering(days_from_today(400), 0.99), false).await;

    let doc = h.service.ingest(upload("passport_john.jpg")).await.unwrap();

    assert_eq!(doc.category, IDENTITY_DOCUMENTS);
    assert_eq!(doc.expiry_date, None);
    assert_eq!(h.vision.calls(), 0);
}

#[tokio::test]
async fn test_ineligible_document_is_not_scanned() {
    let h = harness(MockVision::answering(days_from_today(400), 0.99), true).await;

    let doc = h.service.ingest(upload("grocery.jpg")).await.unwrap();

    assert_eq!(doc.category, RECEIPTS);
    assert_eq!(h.vision.calls(), 0);
}

#[tokio::test]
async fn test_declared_expiry_skips_scan_and_follows_lead_times() {
    let h = harness(MockVision::answering(days_from_today(400), 0.99), true).await;

    // 45 days out: the 90-day reminder would be in the past.
    let declared = days_from_today(45);
    let doc = h
        .service
        .ingest(IngestRequest {
            expiry_date: Some(declared),
            ..upload("passport_john.jpg")
        })
        .await
        .unwrap();

    assert_eq!(doc.expiry_date, Some(declared));
    assert_eq!(h.vision.calls(), 0);

    let reminders = h.store.get_document_reminders(&doc.id, USER).await.unwrap();
    assert_eq!(reminders.len(), 2);
}

#[tokio::test]
async fn test_declared_category_wins_over_classifier() {
    let h = harness(MockVision::answering(days_from_today(400), 0.99), true).await;

    let doc = h
        .service
        .ingest(IngestRequest {
            category: Some("Medical Records".to_string()),
            tags: vec!["family".to_string()],
            ..upload("passport_john.jpg")
        })
        .await
        .unwrap();

    assert_eq!(doc.category, "Medical Records");
    assert_eq!(doc.tags, vec!["family".to_string()]);
    // Not an eligible category any more.
    assert_eq!(h.vision.calls(), 0);
}

#[tokio::test]
async fn test_pdf_is_stored_without_scanning() {
    let h = harness(MockVision::answering(days_from_today(400), 0.99), true).await;

    let doc = h
        .service
        .ingest(IngestRequest {
            mime_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n".to_vec(),
            ..upload("passport_scan.pdf")
        })
        .await
        .unwrap();

    assert_eq!(doc.mime_type, "application/pdf");
    assert_eq!(doc.expiry_date, None);
    assert_eq!(h.vision.calls(), 0);
}

#[tokio::test]
async fn test_identical_uploads_are_not_deduplicated() {
    let h = harness(MockVision::answering(days_from_today(400), 0.4), false).await;

    let first = h.service.ingest(upload("receipt.jpg")).await.unwrap();
    let second = h.service.ingest(upload("receipt.jpg")).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_ne!(first.filename, second.filename);
    assert_eq!(h.store.list_documents(USER).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_reminder_failures_do_not_fail_ingestion() {
    let store = Arc::new(NoReminderStore {
        inner: MemoryStore::new(),
    });
    let expiry = days_from_today(400);
    let h = harness_with(store, MockVision::answering(expiry, 0.95), true).await;

    let doc = h.service.ingest(upload("passport_john.jpg")).await.unwrap();

    assert_eq!(doc.expiry_date, Some(expiry));
    assert!(h.store.get_document(&doc.id, USER).await.unwrap().is_some());
    assert!(h.store.get_document_reminders(&doc.id, USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_document_write_removes_stored_bytes() {
    let h = harness_with(
        Arc::new(BrokenStore),
        MockVision::answering(days_from_today(400), 0.95),
        true,
    )
    .await;

    let result = h.service.ingest(upload("passport_john.jpg")).await;

    assert!(matches!(result, Err(AppError::Store(StoreError::Unavailable(_)))));
    assert_eq!(h.vision.calls(), 0);

    let mut entries = tokio::fs::read_dir(h.storage.root()).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_uploads_are_rejected_without_state() {
    let h = harness(MockVision::answering(days_from_today(400), 0.95), true).await;

    let empty = h
        .service
        .ingest(IngestRequest {
            bytes: vec![],
            ..upload("passport_john.jpg")
        })
        .await;
    assert!(matches!(empty, Err(AppError::BadRequest(_))));

    let exe = h.service.ingest(upload("passport.exe")).await;
    assert!(matches!(exe, Err(AppError::BadRequest(_))));

    assert!(h.store.list_documents(USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_first_expiry_via_update_schedules_once() {
    let h = harness(MockVision::answering(days_from_today(400), 0.4), true).await;
    let doc = h.service.ingest(upload("passport_john.jpg")).await.unwrap();
    assert_eq!(doc.expiry_date, None);

    let updated = h
        .service
        .update_document(
            USER,
            &doc.id,
            DocumentPatch {
                expiry_date: Some(days_from_today(200)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.expiry_date, Some(days_from_today(200)));
    assert_eq!(
        h.store.get_document_reminders(&doc.id, USER).await.unwrap().len(),
        3
    );

    // Correcting the date leaves the existing reminders alone.
    h.service
        .update_document(
            USER,
            &doc.id,
            DocumentPatch {
                expiry_date: Some(days_from_today(300)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        h.store.get_document_reminders(&doc.id, USER).await.unwrap().len(),
        3
    );
}

#[tokio::test]
async fn test_concurrent_first_expiry_updates_schedule_once() {
    let h = harness(MockVision::answering(days_from_today(400), 0.4), true).await;
    let doc = h.service.ingest(upload("passport_john.jpg")).await.unwrap();

    let patch = || DocumentPatch {
        expiry_date: Some(days_from_today(200)),
        ..Default::default()
    };
    let (a, b) = tokio::join!(
        h.service.update_document(USER, &doc.id, patch()),
        h.service.update_document(USER, &doc.id, patch()),
    );
    assert_eq!(a.unwrap().expiry_date, Some(days_from_today(200)));
    assert_eq!(b.unwrap().expiry_date, Some(days_from_today(200)));

    assert_eq!(
        h.store.get_document_reminders(&doc.id, USER).await.unwrap().len(),
        3
    );
}

#[tokio::test]
async fn test_out_of_range_expiry_is_rejected() {
    let h = harness(MockVision::answering(days_from_today(400), 0.4), true).await;

    let declared = h
        .service
        .ingest(IngestRequest {
            expiry_date: Some(NaiveDate::MIN),
            ..upload("passport_john.jpg")
        })
        .await;
    assert!(matches!(declared, Err(AppError::BadRequest(_))));
    assert!(h.store.list_documents(USER).await.unwrap().is_empty());

    let doc = h.service.ingest(upload("passport_john.jpg")).await.unwrap();
    let patched = h
        .service
        .update_document(
            USER,
            &doc.id,
            DocumentPatch {
                expiry_date: NaiveDate::from_ymd_opt(1850, 1, 1),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(patched, Err(AppError::BadRequest(_))));
    assert!(h.store.get_document_reminders(&doc.id, USER).await.unwrap().is_empty());

    // A scanned date that far out reads as no date at all.
    let h = harness(MockVision::answering(NaiveDate::MIN, 0.95), true).await;
    let doc = h.service.ingest(upload("passport_john.jpg")).await.unwrap();
    assert_eq!(h.vision.calls(), 1);
    assert_eq!(doc.expiry_date, None);
    assert!(h.store.get_document_reminders(&doc.id, USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_cascades_and_removes_file() {
    let h = harness(MockVision::answering(days_from_today(400), 0.95), true).await;
    let doc = h.service.ingest(upload("passport_john.jpg")).await.unwrap();
    assert_eq!(h.store.get_active_reminders(USER).await.unwrap().len(), 3);

    // Other users see nothing to delete.
    let other = h.service.delete_document("user-2", &doc.id).await;
    assert!(matches!(other, Err(AppError::NotFound(_))));

    h.service.delete_document(USER, &doc.id).await.unwrap();

    assert!(h.store.get_document(&doc.id, USER).await.unwrap().is_none());
    assert!(h.store.get_active_reminders(USER).await.unwrap().is_empty());
    assert!(!h.storage.file_exists(&doc.filename).await.unwrap());
}

#[tokio::test]
async fn test_manual_reminder_and_dismissal() {
    let h = harness(MockVision::answering(days_from_today(400), 0.4), true).await;
    let doc = h.service.ingest(upload("receipt.jpg")).await.unwrap();

    let at = Utc::now() + Duration::days(5);
    let reminder = h
        .service
        .create_reminder(USER, &doc.id, at, "Claim the warranty")
        .await
        .unwrap();
    assert!(reminder.is_active);

    let upcoming = h.service.upcoming_reminders(USER, 30).await.unwrap();
    assert_eq!(upcoming.len(), 1);

    let past = h
        .service
        .create_reminder(USER, &doc.id, Utc::now() - Duration::days(1), "Too late")
        .await;
    assert!(matches!(past, Err(AppError::BadRequest(_))));

    let foreign = h
        .service
        .create_reminder("user-2", &doc.id, at, "Not mine")
        .await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));

    let dismissed = h.service.dismiss_reminder(USER, &reminder.id).await.unwrap();
    assert!(!dismissed.is_active);
    assert!(h.service.active_reminders(USER).await.unwrap().is_empty());
    // Dismissal never deletes.
    assert_eq!(
        h.service.document_reminders(USER, &doc.id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_stats_and_expiring_documents() {
    let h = harness(MockVision::answering(days_from_today(20), 0.95), true).await;

    h.service.ingest(upload("passport_john.jpg")).await.unwrap();
    h.service.ingest(upload("receipt.jpg")).await.unwrap();
    h.service
        .ingest(IngestRequest {
            expiry_date: Some(days_from_today(120)),
            ..upload("insurance_policy.jpg")
        })
        .await
        .unwrap();

    let stats = h.service.stats(USER).await.unwrap();
    assert_eq!(stats.total_documents, 3);
    assert_eq!(stats.expiring_soon, 1);
    assert_eq!(stats.by_category.len(), 3);
    // passport: 7-day lead only; insurance: 90/30/7.
    assert_eq!(stats.active_reminders, 4);

    let expiring = h.service.expiring_documents(USER, 60).await.unwrap();
    assert_eq!(expiring.len(), 1);
    assert_eq!(expiring[0].original_filename, "passport_john.jpg");
}
