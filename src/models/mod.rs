use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

pub const IDENTITY_DOCUMENTS: &str = "Identity Documents";
pub const BILLS_AND_UTILITIES: &str = "Bills & Utilities";
pub const MEDICAL_RECORDS: &str = "Medical Records";
pub const RECEIPTS: &str = "Receipts";
pub const TRAVEL_DOCUMENTS: &str = "Travel Documents";
pub const INSURANCE: &str = "Insurance";
/// Not seeded, but eligible for scanning when a user creates it.
pub const LEGAL_DOCUMENTS: &str = "Legal Documents";

/// Built-in categories: (name, icon, color, description).
pub const BUILTIN_CATEGORIES: [(&str, &str, &str, &str); 6] = [
    (
        IDENTITY_DOCUMENTS,
        "id-card",
        "#3B82F6",
        "Passports, driving licences, residence permits",
    ),
    (
        BILLS_AND_UTILITIES,
        "file-invoice",
        "#F59E0B",
        "Utility bills and invoices",
    ),
    (
        MEDICAL_RECORDS,
        "heart-pulse",
        "#EF4444",
        "Medical and health records",
    ),
    (RECEIPTS, "receipt", "#10B981", "Purchase receipts"),
    (
        TRAVEL_DOCUMENTS,
        "plane",
        "#8B5CF6",
        "Tickets, visas and travel bookings",
    ),
    (
        INSURANCE,
        "shield",
        "#6366F1",
        "Insurance policies and certificates",
    ),
];

/// Converts a calendar date to the timestamp it is stored as (00:00 UTC).
pub fn date_to_timestamp(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Upper bound for `?days=` look-ahead windows.
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Years accepted for an expiry date, whether typed in or read off a scan.
pub const EXPIRY_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

pub fn is_plausible_expiry(date: NaiveDate) -> bool {
    EXPIRY_YEARS.contains(&date.year())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub user_id: String,
    /// System-assigned name under which the bytes are stored.
    pub filename: String,
    pub original_filename: String,
    pub mime_type: String,
    pub size: i64,
    pub category: String,
    pub tags: Vec<String>,
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,
    pub expiry_date: Option<NaiveDate>,
    pub is_encrypted: bool,
    pub uploaded_at: DateTime<Utc>,
}

/// Fields supplied when a document row is first written.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: String,
    pub filename: String,
    pub original_filename: String,
    pub mime_type: String,
    pub size: i64,
    pub category: String,
    pub tags: Vec<String>,
    pub metadata: Map<String, Value>,
    pub expiry_date: Option<NaiveDate>,
    pub is_encrypted: bool,
}

impl NewDocument {
    pub fn into_document(self) -> Document {
        Document {
            id: Uuid::new_v4().to_string(),
            user_id: self.user_id,
            filename: self.filename,
            original_filename: self.original_filename,
            mime_type: self.mime_type,
            size: self.size,
            category: self.category,
            tags: self.tags,
            metadata: self.metadata,
            expiry_date: self.expiry_date,
            is_encrypted: self.is_encrypted,
            uploaded_at: Utc::now(),
        }
    }
}

/// Partial update of a document. `None` leaves a field untouched.
/// An expiry date can be set or corrected but never cleared.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub expiry_date: Option<NaiveDate>,
    pub metadata: Option<Map<String, Value>>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.tags.is_none()
            && self.expiry_date.is_none()
            && self.metadata.is_none()
    }

    pub fn apply(self, document: &mut Document) {
        if let Some(category) = self.category {
            document.category = category;
        }
        if let Some(tags) = self.tags {
            document.tags = tags;
        }
        if let Some(expiry_date) = self.expiry_date {
            document.expiry_date = Some(expiry_date);
        }
        if let Some(metadata) = self.metadata {
            document.metadata = metadata;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub user_id: String,
    pub document_id: String,
    pub reminder_date: DateTime<Utc>,
    pub message: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReminder {
    pub user_id: String,
    pub document_id: String,
    pub reminder_date: DateTime<Utc>,
    pub message: String,
}

impl NewReminder {
    pub fn into_reminder(self) -> Reminder {
        Reminder {
            id: Uuid::new_v4().to_string(),
            user_id: self.user_id,
            document_id: self.document_id,
            reminder_date: self.reminder_date,
            message: self.message,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub description: Option<String>,
}

impl NewCategory {
    pub fn into_category(self) -> Category {
        Category {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            icon: self.icon,
            color: self.color,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    Passport,
    BiometricResidencePermit,
    DrivingLicense,
    IdCard,
    Other,
}

impl DocumentType {
    /// Maps the loosely formatted labels returned by inference services.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "" => None,
            "passport" => Some(Self::Passport),
            "brp" | "biometric-residence-permit" | "residence-permit" => {
                Some(Self::BiometricResidencePermit)
            }
            "driving-license" | "driving-licence" | "drivers-license" | "driver-license" => {
                Some(Self::DrivingLicense)
            }
            "id-card" | "identity-card" | "national-id" => Some(Self::IdCard),
            _ => Some(Self::Other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::BiometricResidencePermit => "biometric-residence-permit",
            Self::DrivingLicense => "driving-license",
            Self::IdCard => "id-card",
            Self::Other => "other",
        }
    }
}

/// Outcome of an expiry scan. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub expiry_date: Option<NaiveDate>,
    pub document_type: Option<DocumentType>,
    pub confidence: f64,
    pub document_number: Option<String>,
}

impl ScanResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.expiry_date.is_none() && self.document_type.is_none() && self.confidence == 0.0
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub total_documents: u64,
    pub by_category: Vec<CategoryCount>,
    pub expiring_soon: u64,
    pub active_reminders: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_labels() {
        assert_eq!(
            DocumentType::from_label("passport"),
            Some(DocumentType::Passport)
        );
        assert_eq!(
            DocumentType::from_label("Driving_License"),
            Some(DocumentType::DrivingLicense)
        );
        assert_eq!(
            DocumentType::from_label("brp"),
            Some(DocumentType::BiometricResidencePermit)
        );
        assert_eq!(
            DocumentType::from_label("library card"),
            Some(DocumentType::Other)
        );
        assert_eq!(DocumentType::from_label("  "), None);
    }

    #[test]
    fn test_patch_never_clears_expiry() {
        let mut doc = NewDocument {
            user_id: "u1".to_string(),
            filename: "a.jpg".to_string(),
            original_filename: "passport.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size: 10,
            category: IDENTITY_DOCUMENTS.to_string(),
            tags: vec![],
            metadata: Map::new(),
            expiry_date: NaiveDate::from_ymd_opt(2030, 1, 1),
            is_encrypted: false,
        }
        .into_document();

        DocumentPatch {
            tags: Some(vec!["travel".to_string()]),
            ..Default::default()
        }
        .apply(&mut doc);

        assert_eq!(doc.expiry_date, NaiveDate::from_ymd_opt(2030, 1, 1));
        assert_eq!(doc.tags, vec!["travel".to_string()]);
    }

    #[test]
    fn test_date_to_timestamp_is_midnight_utc() {
        let ts = date_to_timestamp(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(ts.to_rfc3339(), "2026-03-01T00:00:00+00:00");
    }

    #[test]
    fn test_expiry_year_bounds() {
        assert!(is_plausible_expiry(NaiveDate::from_ymd_opt(2031, 6, 30).unwrap()));
        assert!(is_plausible_expiry(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()));
        assert!(!is_plausible_expiry(NaiveDate::from_ymd_opt(1899, 12, 31).unwrap()));
        assert!(!is_plausible_expiry(NaiveDate::MIN));
        assert!(!is_plausible_expiry(NaiveDate::MAX));
    }
}
