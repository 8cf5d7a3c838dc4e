use clap::Parser;
use doc_vault::config::AppConfig;
use doc_vault::infrastructure::{database, scanner, seed, storage};
use doc_vault::services::document_service::DocumentService;
use doc_vault::store::{DatabaseStore, DocumentStore, MemoryStore};
use doc_vault::{AppState, create_app};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port for the API server
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Keep everything in memory instead of DATABASE_URL
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doc_vault=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Document Vault...");

    let config = AppConfig::from_env();
    info!(
        "🛡️  Config: Max Size={}MB, Scanning={}, Scanner={}, Storage={}",
        config.max_file_size / 1024 / 1024,
        config.enable_document_scanning,
        config.scanner_type,
        config.storage_backend
    );

    let store: Arc<dyn DocumentStore> = if args.in_memory {
        info!("🧠 Using in-memory store, data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let db = database::setup_database().await?;
        Arc::new(DatabaseStore::new(db))
    };
    seed::seed_default_categories(store.as_ref()).await?;

    let storage_service = storage::setup_storage(&config).await?;
    let expiry_scanner = scanner::setup_scanner(&config).await;

    let document_service = Arc::new(DocumentService::new(
        store.clone(),
        storage_service,
        expiry_scanner,
        config.max_file_size,
    ));

    let state = AppState {
        store,
        document_service,
        config,
    };

    let app = create_app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ API Server listening on: http://0.0.0.0:{}", args.port);
    info!(
        "📖 Swagger UI documentation: http://localhost:{}/swagger-ui",
        args.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Document Vault exited cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, initiating graceful shutdown...");
        },
    }
}
