use chrono::NaiveDate;

/// An upload as received from the client.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub user_id: String,
    pub original_filename: String,
    /// Declared MIME type; re-detected when missing or generic.
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
    pub category: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub tags: Vec<String>,
}
