use crate::config::AppConfig;
use crate::models::{DocumentType, ScanResult, is_plausible_expiry};
use async_trait::async_trait;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

const SYSTEM_PROMPT: &str = "\
You extract structured data from photos of identity documents such as passports, \
biometric residence permits, driving licences and ID cards. \
Answer with a single JSON object and nothing else.";

const EXTRACTION_PROMPT: &str = "\
Find the expiry date on this document. It is usually labelled \"Date of expiry\", \
\"Valid until\", \"Expires\" or \"Expiry\". Return JSON with exactly these keys:\n\
- \"expiryDate\": the expiry date as YYYY-MM-DD, or null if none is visible\n\
- \"documentType\": one of \"passport\", \"biometric-residence-permit\", \
\"driving-license\", \"id-card\", \"other\", or null\n\
- \"confidence\": a number between 0 and 1 describing how sure you are about the date\n\
- \"documentNumber\": the document number if visible, otherwise null";

/// Failures talking to the inference service. These never leave the
/// scanner; [`ExpiryScanner::scan`] turns them into an empty result.
#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Structured answer as returned by the inference service, before any
/// normalization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExtraction {
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub document_number: Option<String>,
}

/// A vision-capable inference service able to read an expiry date off an
/// image.
#[async_trait]
pub trait VisionClient: Send + Sync {
    async fn extract_expiry(
        &self,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<RawExtraction, ScannerError>;

    /// Check if the service is configured and reachable
    async fn health_check(&self) -> bool;
}

/// Vision client speaking the OpenAI-compatible chat completions protocol.
pub struct OpenAiVisionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    timeout_secs: u64,
}

impl OpenAiVisionClient {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        model: String,
        timeout_secs: u64,
    ) -> Result<Self, ScannerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ScannerError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            model,
            timeout_secs,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ScannerError> {
        Self::new(
            config.vision_api_url.clone(),
            config.vision_api_key.clone(),
            config.vision_model.clone(),
            config.vision_timeout_secs,
        )
    }

    fn build_request(&self, image_base64: &str, mime_type: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "temperature": 0.0,
            "max_tokens": 300,
            "response_format": { "type": "json_object" },
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT,
                },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": EXTRACTION_PROMPT },
                        {
                            "type": "image_url",
                            "image_url": {
                                "url": format!("data:{};base64,{}", mime_type, image_base64)
                            }
                        }
                    ]
                }
            ]
        })
    }

    /// Parse the model's message content, tolerating markdown code fences.
    fn parse_content(content: &str) -> Result<RawExtraction, ScannerError> {
        let trimmed = content.trim();

        let json_str = if trimmed.starts_with("```") {
            let without_opening = trimmed
                .strip_prefix("```json")
                .unwrap_or_else(|| trimmed.strip_prefix("```").unwrap_or(trimmed));
            without_opening
                .strip_suffix("```")
                .unwrap_or(without_opening)
                .trim()
        } else {
            trimmed
        };

        serde_json::from_str::<RawExtraction>(json_str).map_err(|e| {
            ScannerError::Parse(format!("model answer is not the expected JSON: {e}"))
        })
    }
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    async fn extract_expiry(
        &self,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<RawExtraction, ScannerError> {
        let body = self.build_request(image_base64, mime_type);

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "sending vision extraction request");

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ScannerError::Timeout(self.timeout_secs)
            } else {
                ScannerError::Http(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScannerError::Api(format!("HTTP {status}: {body}")));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScannerError::Parse(format!("failed to parse API response: {e}")))?;

        let content = response_json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                ScannerError::Parse(format!("unexpected response format: {response_json}"))
            })?;

        Self::parse_content(content)
    }

    async fn health_check(&self) -> bool {
        !self.endpoint.is_empty()
    }
}

/// Client used when no inference service is configured.
pub struct NoOpVisionClient;

#[async_trait]
impl VisionClient for NoOpVisionClient {
    async fn extract_expiry(
        &self,
        _image_base64: &str,
        _mime_type: &str,
    ) -> Result<RawExtraction, ScannerError> {
        tracing::warn!("NoOpVisionClient: no inference service configured, skipping extraction");
        Ok(RawExtraction::default())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Factory function to create the vision client named by the config
pub fn create_vision_client(config: &AppConfig) -> Arc<dyn VisionClient> {
    match config.scanner_type.to_lowercase().as_str() {
        "vision" | "openai" => match OpenAiVisionClient::from_config(config) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::error!("Failed to build vision client ({}), using NoOpVisionClient", e);
                Arc::new(NoOpVisionClient)
            }
        },
        "noop" | "none" | "disabled" => Arc::new(NoOpVisionClient),
        other => {
            tracing::warn!("Unknown scanner type '{}', using NoOpVisionClient", other);
            Arc::new(NoOpVisionClient)
        }
    }
}

enum ScanInput {
    Image,
    Pdf,
    Unsupported,
}

fn classify_input(mime_type: &str) -> ScanInput {
    match mime_type.trim().parse::<mime::Mime>() {
        Ok(m) if m.type_() == mime::IMAGE => ScanInput::Image,
        Ok(m) if m.type_() == mime::APPLICATION && m.subtype() == mime::PDF => ScanInput::Pdf,
        _ => ScanInput::Unsupported,
    }
}

/// Reads expiry information from document images.
///
/// `scan` never fails: a disabled scanner, an unsupported file type and any
/// inference failure all produce [`ScanResult::empty`].
pub struct ExpiryScanner {
    client: Arc<dyn VisionClient>,
    enabled: bool,
}

impl ExpiryScanner {
    pub fn new(client: Arc<dyn VisionClient>, enabled: bool) -> Self {
        Self { client, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn health_check(&self) -> bool {
        self.client.health_check().await
    }

    pub async fn scan(&self, bytes: &[u8], mime_type: &str) -> ScanResult {
        if !self.enabled {
            tracing::debug!("Document scanning disabled, skipping");
            return ScanResult::empty();
        }

        match classify_input(mime_type) {
            ScanInput::Image => {}
            ScanInput::Pdf => {
                tracing::debug!("PDF scanning not supported, skipping");
                return ScanResult::empty();
            }
            ScanInput::Unsupported => {
                tracing::debug!(mime_type = %mime_type, "Unsupported type for scanning");
                return ScanResult::empty();
            }
        }

        let start = Instant::now();
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

        match self.client.extract_expiry(&encoded, mime_type).await {
            Ok(raw) => {
                let result = normalize_extraction(raw);
                tracing::info!(
                    elapsed_ms = %start.elapsed().as_millis(),
                    found_date = result.expiry_date.is_some(),
                    document_type = ?result.document_type,
                    confidence = result.confidence,
                    "🔎 Expiry scan complete"
                );
                result
            }
            Err(e) => {
                tracing::warn!(
                    elapsed_ms = %start.elapsed().as_millis(),
                    "⚠️  Expiry scan failed, continuing without scan data: {}",
                    e
                );
                ScanResult::empty()
            }
        }
    }
}

/// Turn a raw service answer into a well-formed [`ScanResult`].
pub fn normalize_extraction(raw: RawExtraction) -> ScanResult {
    let expiry_date = raw.expiry_date.as_deref().and_then(parse_expiry_date);
    if raw.expiry_date.is_some() && expiry_date.is_none() {
        tracing::debug!("Discarding unparseable expiry date {:?}", raw.expiry_date);
    }

    ScanResult {
        expiry_date,
        document_type: raw.document_type.as_deref().and_then(DocumentType::from_label),
        confidence: clamp_confidence(raw.confidence.unwrap_or(0.0)),
        document_number: raw
            .document_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
    }
}

pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Parse a date in any of the shapes inference services tend to produce.
/// Dates outside [`EXPIRY_YEARS`](crate::models::EXPIRY_YEARS) count as
/// unreadable.
pub fn parse_expiry_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let date = match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.date_naive()),
        Err(_) => DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok()),
    };
    date.filter(|d| is_plausible_expiry(*d))
}
