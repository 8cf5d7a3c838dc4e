use crate::config::AppConfig;
use crate::services::scanner::{ExpiryScanner, create_vision_client};
use std::sync::Arc;
use tracing::info;

pub async fn setup_scanner(config: &AppConfig) -> Arc<ExpiryScanner> {
    let client = create_vision_client(config);
    let scanner = ExpiryScanner::new(client, config.enable_document_scanning);

    if scanner.is_enabled() {
        if scanner.health_check().await {
            info!(
                "🔎 Expiry scanning enabled ({} via {})",
                config.vision_model, config.scanner_type
            );
        } else {
            tracing::warn!(
                "⚠️  Expiry scanning enabled but the vision service is not configured. Uploads will be stored without scanned dates."
            );
        }
    } else {
        info!("🔎 Expiry scanning disabled, document contents stay on this server");
    }

    Arc::new(scanner)
}
