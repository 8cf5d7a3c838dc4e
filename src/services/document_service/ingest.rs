use super::{CONFIDENCE_THRESHOLD, DocumentService, IngestRequest};
use crate::api::error::AppError;
use crate::models::{Document, DocumentPatch, NewDocument, ScanResult, is_plausible_expiry};
use crate::services::{
    classifier::CategoryClassifier, eligibility::ScanEligibility,
    reminder_scheduler::schedule_expiry_reminders,
};
use crate::utils::validation::{storage_filename, validate_upload};
use serde_json::{Map, json};
use tracing::{debug, info, warn};

impl DocumentService {
    /// Stores an upload and derives its expiry date.
    ///
    /// A declared expiry date is used as-is and the scanner is never called.
    /// Otherwise eligible documents are scanned, and the scanned date is
    /// kept only when its confidence is strictly above
    /// [`CONFIDENCE_THRESHOLD`]. Reminders are scheduled once, at the moment
    /// the document first gets an expiry date.
    pub async fn ingest(&self, request: IngestRequest) -> Result<Document, AppError> {
        let IngestRequest {
            user_id,
            original_filename,
            mime_type,
            bytes,
            category,
            expiry_date,
            tags,
        } = request;

        if bytes.len() > self.max_file_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the {} MB limit",
                self.max_file_size / 1024 / 1024
            )));
        }

        let (original_filename, mime_type) = validate_upload(
            &original_filename,
            mime_type.as_deref(),
            &bytes,
            self.max_file_size,
        )
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if expiry_date.is_some_and(|d| !is_plausible_expiry(d)) {
            return Err(AppError::BadRequest(
                "expiryDate must fall between 1900 and 9999".to_string(),
            ));
        }

        let category = match category.map(|c| c.trim().to_string()) {
            Some(c) if !c.is_empty() => c,
            _ => CategoryClassifier::classify(&original_filename, &mime_type).to_string(),
        };

        // 1. Store the bytes
        let filename = storage_filename(&original_filename);
        self.storage
            .upload_file(&filename, bytes.clone())
            .await
            .map_err(|e| AppError::Internal(format!("Storage error: {}", e)))?;

        // 2. Record the document
        let created = self
            .store
            .create_document(NewDocument {
                user_id: user_id.clone(),
                filename: filename.clone(),
                original_filename: original_filename.clone(),
                mime_type: mime_type.clone(),
                size: bytes.len() as i64,
                category: category.clone(),
                tags,
                metadata: Map::new(),
                expiry_date,
                is_encrypted: false,
            })
            .await;

        let document = match created {
            Ok(document) => document,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete_file(&filename).await {
                    warn!("⚠️  Failed to remove orphaned upload {}: {}", filename, cleanup);
                }
                return Err(e.into());
            }
        };

        info!(
            document_id = %document.id,
            category = %document.category,
            size = document.size,
            "📄 Stored document {}",
            document.original_filename
        );

        if document.expiry_date.is_some() {
            schedule_expiry_reminders(self.store.as_ref(), &document).await;
            return Ok(document);
        }

        if !ScanEligibility::should_scan(&original_filename, &category) {
            return Ok(document);
        }

        // 3. Try to read an expiry date off the document
        let scan = self.scanner.scan(&bytes, &mime_type).await;
        let Some(expiry) = accepted_expiry(&scan) else {
            if scan.expiry_date.is_some() {
                debug!(
                    document_id = %document.id,
                    confidence = scan.confidence,
                    "Discarding low-confidence expiry date"
                );
            }
            return Ok(document);
        };

        if !self
            .store
            .set_expiry_if_absent(&document.id, &user_id, expiry)
            .await?
        {
            // An edit set the date first and scheduled its own reminders.
            return self.get_document(&user_id, &document.id).await;
        }

        let mut metadata = document.metadata.clone();
        metadata.insert(
            "scan".to_string(),
            json!({
                "documentType": scan.document_type.map(|t| t.as_str()),
                "confidence": scan.confidence,
            }),
        );

        let updated = self
            .store
            .update_document(
                &document.id,
                &user_id,
                DocumentPatch {
                    metadata: Some(metadata),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| AppError::Internal(format!("Document {} vanished", document.id)))?;

        info!(
            document_id = %updated.id,
            expiry_date = %expiry,
            confidence = scan.confidence,
            "🗓️  Expiry date detected"
        );

        // 4. Schedule against the stored document
        schedule_expiry_reminders(self.store.as_ref(), &updated).await;
        Ok(updated)
    }
}

/// The scanned expiry date, if the scan is confident enough to use it.
pub fn accepted_expiry(scan: &ScanResult) -> Option<chrono::NaiveDate> {
    scan.expiry_date
        .filter(|_| scan.confidence > CONFIDENCE_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn scan(confidence: f64) -> ScanResult {
        ScanResult {
            expiry_date: NaiveDate::from_ymd_opt(2031, 6, 30),
            confidence,
            ..Default::default()
        }
    }

    #[test]
    fn test_confidence_gate_is_strict() {
        assert!(accepted_expiry(&scan(0.95)).is_some());
        assert!(accepted_expiry(&scan(0.71)).is_some());
        assert!(accepted_expiry(&scan(0.7)).is_none());
        assert!(accepted_expiry(&scan(0.4)).is_none());
        assert!(accepted_expiry(&ScanResult::empty()).is_none());
    }
}
