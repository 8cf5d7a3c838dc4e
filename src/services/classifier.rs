use crate::models::{
    BILLS_AND_UTILITIES, IDENTITY_DOCUMENTS, INSURANCE, MEDICAL_RECORDS, RECEIPTS,
    TRAVEL_DOCUMENTS,
};

/// Keyword groups in priority order. The first group with a hit wins.
const KEYWORD_GROUPS: &[(&str, &[&str])] = &[
    (
        IDENTITY_DOCUMENTS,
        &[
            "passport",
            "license",
            "licence",
            "id",
            "brp",
            "biometric",
            "residence permit",
        ],
    ),
    (BILLS_AND_UTILITIES, &["bill", "utility", "invoice"]),
    (MEDICAL_RECORDS, &["medical", "health", "doctor"]),
    (RECEIPTS, &["receipt", "purchase"]),
    (TRAVEL_DOCUMENTS, &["ticket", "visa", "travel"]),
    (INSURANCE, &["insurance", "policy"]),
];

pub struct CategoryClassifier;

impl CategoryClassifier {
    /// Guesses a category from the filename alone. Files matching nothing
    /// land in "Receipts".
    ///
    /// `_mime_type` is accepted so callers don't change when content-based
    /// rules are added.
    pub fn classify(filename: &str, _mime_type: &str) -> &'static str {
        let name = filename.to_lowercase();

        KEYWORD_GROUPS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(RECEIPTS)
    }
}
