pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use crate::config::AppConfig;
use crate::services::document_service::DocumentService;
use crate::store::DocumentStore;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::documents::upload::upload_document,
        api::handlers::documents::list::list_documents,
        api::handlers::documents::list::expiring_documents,
        api::handlers::documents::manage::get_document,
        api::handlers::documents::manage::update_document,
        api::handlers::documents::manage::delete_document,
        api::handlers::documents::manage::download_document,
        api::handlers::documents::manage::document_reminders,
        api::handlers::reminders::list_active_reminders,
        api::handlers::reminders::upcoming_reminders,
        api::handlers::reminders::create_reminder,
        api::handlers::reminders::dismiss_reminder,
        api::handlers::categories::list_categories,
        api::handlers::categories::create_category,
        api::handlers::categories::delete_category,
        api::handlers::stats::get_stats,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::Document,
            models::Reminder,
            models::Category,
            models::DocumentStats,
            models::CategoryCount,
            api::handlers::documents::types::UpdateDocumentRequest,
            api::handlers::documents::types::CreateReminderRequest,
            api::handlers::documents::types::CreateCategoryRequest,
            api::handlers::health::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "documents", description = "Document vault endpoints"),
        (name = "reminders", description = "Expiry reminder endpoints"),
        (name = "categories", description = "Category endpoints"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub document_service: Arc<DocumentService>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/documents",
            get(api::handlers::documents::list_documents)
                .post(api::handlers::documents::upload_document),
        )
        .route(
            "/api/documents/expiring",
            get(api::handlers::documents::expiring_documents),
        )
        .route(
            "/api/documents/:id",
            get(api::handlers::documents::get_document)
                .patch(api::handlers::documents::update_document)
                .delete(api::handlers::documents::delete_document),
        )
        .route(
            "/api/documents/:id/download",
            get(api::handlers::documents::download_document),
        )
        .route(
            "/api/documents/:id/reminders",
            get(api::handlers::documents::document_reminders),
        )
        .route(
            "/api/reminders",
            get(api::handlers::reminders::list_active_reminders)
                .post(api::handlers::reminders::create_reminder),
        )
        .route(
            "/api/reminders/upcoming",
            get(api::handlers::reminders::upcoming_reminders),
        )
        .route(
            "/api/reminders/:id/dismiss",
            post(api::handlers::reminders::dismiss_reminder),
        )
        .route(
            "/api/categories",
            get(api::handlers::categories::list_categories)
                .post(api::handlers::categories::create_category),
        )
        .route(
            "/api/categories/:id",
            axum::routing::delete(api::handlers::categories::delete_category),
        )
        .route("/api/stats", get(api::handlers::stats::get_stats))
        .route_layer(from_fn_with_state(
            state.clone(),
            api::middleware::auth::auth_middleware,
        ));

    // Configure tracing layer for HTTP requests
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            let request_id = request
                .headers()
                .get(api::middleware::request_id::REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .merge(api_routes)
        .layer(cors_layer(&state.config))
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_file_size + 1024 * 1024, // multipart overhead
        ))
        .layer(trace_layer)
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() || config.allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION])
}
