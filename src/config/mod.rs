use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Maximum file size in bytes (default: 25 MB)
    pub max_file_size: usize,

    /// Enable AI expiry scanning of uploaded documents (default: false).
    /// When off, no document bytes ever leave the server.
    pub enable_document_scanning: bool,

    /// Scanner type: "vision" or "noop" (default: "vision")
    pub scanner_type: String,

    /// OpenAI-compatible chat completions endpoint
    pub vision_api_url: String,

    /// API key for the vision endpoint
    pub vision_api_key: Option<String>,

    /// Vision model name (default: "gpt-4o-mini")
    pub vision_model: String,

    /// HTTP timeout for the vision endpoint in seconds (default: 30)
    pub vision_timeout_secs: u64,

    /// File storage backend: "local" or "s3" (default: "local")
    pub storage_backend: String,

    /// Directory for the local storage backend (default: "uploads")
    pub upload_dir: String,

    /// JWT Secret Key
    pub jwt_secret: String,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_file_size: 25 * 1024 * 1024, // 25 MB
            enable_document_scanning: false,
            scanner_type: "vision".to_string(),
            vision_api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            vision_api_key: None,
            vision_model: "gpt-4o-mini".to_string(),
            vision_timeout_secs: 30,
            storage_backend: "local".to_string(),
            upload_dir: "uploads".to_string(),
            jwt_secret: "secret".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            enable_document_scanning: env::var("ENABLE_DOCUMENT_SCANNING")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.enable_document_scanning),

            scanner_type: env::var("SCANNER_TYPE").unwrap_or(default.scanner_type),

            vision_api_url: env::var("VISION_API_URL").unwrap_or(default.vision_api_url),

            vision_api_key: env::var("VISION_API_KEY")
                .ok()
                .filter(|v| !v.is_empty()),

            vision_model: env::var("VISION_MODEL").unwrap_or(default.vision_model),

            vision_timeout_secs: env::var("VISION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.vision_timeout_secs),

            storage_backend: env::var("STORAGE_BACKEND").unwrap_or(default.storage_backend),

            upload_dir: env::var("UPLOAD_DIR").unwrap_or(default.upload_dir),

            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development (no scanning, local storage)
    pub fn development() -> Self {
        Self {
            enable_document_scanning: false,
            scanner_type: "noop".to_string(),
            storage_backend: "local".to_string(),
            ..Self::default()
        }
    }

    /// Create config for production (scanning on, S3 storage)
    pub fn production() -> Self {
        let default = Self::default();
        Self {
            enable_document_scanning: true,
            scanner_type: "vision".to_string(),
            vision_api_key: env::var("VISION_API_KEY").ok(),
            storage_backend: "s3".to_string(),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret.clone()),
            ..default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.max_file_size, 25 * 1024 * 1024);
        assert!(!config.enable_document_scanning);
        assert_eq!(config.scanner_type, "vision");
        assert_eq!(config.storage_backend, "local");
    }

    #[test]
    fn test_development_config() {
        let config = AppConfig::development();
        assert!(!config.enable_document_scanning);
        assert_eq!(config.scanner_type, "noop");
    }

    #[test]
    fn test_production_config() {
        let config = AppConfig::production();
        assert!(config.enable_document_scanning);
        assert_eq!(config.scanner_type, "vision");
        assert_eq!(config.storage_backend, "s3");
    }
}
