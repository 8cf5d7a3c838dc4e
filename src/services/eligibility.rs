use crate::models::{IDENTITY_DOCUMENTS, LEGAL_DOCUMENTS};

const SCANNABLE_CATEGORIES: [&str; 2] = [IDENTITY_DOCUMENTS, LEGAL_DOCUMENTS];

const EXPIRY_KEYWORDS: [&str; 14] = [
    "passport",
    "brp",
    "biometric",
    "residence",
    "permit",
    "license",
    "licence",
    "driving",
    "id",
    "identity",
    "visa",
    "work",
    "student",
    "tier",
];

pub struct ScanEligibility;

impl ScanEligibility {
    /// Whether a document is a candidate for automatic expiry scanning.
    ///
    /// Legal documents need a telling filename; identity documents are always
    /// scanned.
    pub fn should_scan(filename: &str, category: &str) -> bool {
        if !SCANNABLE_CATEGORIES.contains(&category) {
            return false;
        }

        let name = filename.to_lowercase();
        let keyword_hit = EXPIRY_KEYWORDS.iter().any(|k| name.contains(k));

        keyword_hit || category == IDENTITY_DOCUMENTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BILLS_AND_UTILITIES, INSURANCE, RECEIPTS, TRAVEL_DOCUMENTS};

    #[test]
    fn test_outside_scannable_categories() {
        for category in [RECEIPTS, BILLS_AND_UTILITIES, TRAVEL_DOCUMENTS, INSURANCE, "Custom"] {
            assert!(!ScanEligibility::should_scan("passport.jpg", category));
            assert!(!ScanEligibility::should_scan("visa_permit.png", category));
        }
    }

    #[test]
    fn test_identity_always_scanned() {
        for filename in ["passport.jpg", "IMG_2231.jpg", "", "scan.png"] {
            assert!(ScanEligibility::should_scan(filename, IDENTITY_DOCUMENTS));
        }
    }

    #[test]
    fn test_legal_documents_need_keyword() {
        assert!(ScanEligibility::should_scan(
            "Tier2_Work_Permit.pdf",
            LEGAL_DOCUMENTS
        ));
        assert!(ScanEligibility::should_scan("student-visa.jpg", LEGAL_DOCUMENTS));
        assert!(!ScanEligibility::should_scan("contract.pdf", LEGAL_DOCUMENTS));
    }
}
