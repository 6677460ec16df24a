pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::api::handlers::{health, pages, predict, upload};
use crate::config::AppConfig;
use crate::services::storage::StorageService;
use crate::services::upload_service::{FILES_ROUTE, UploadService};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Room left on top of `max_file_size` for multipart framing
const MULTIPART_OVERHEAD: usize = 10 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(title = "Mesh Viewer Backend"),
    paths(
        api::handlers::pages::index,
        api::handlers::pages::viewer,
        api::handlers::pages::data_explorer,
        api::handlers::pages::results,
        api::handlers::health::health_check,
        api::handlers::upload::upload_mesh,
        api::handlers::predict::predict,
    ),
    components(
        schemas(
            api::error::ErrorResponse,
            api::handlers::health::HealthResponse,
            api::handlers::upload::UploadForm,
            api::handlers::predict::Prediction,
            api::handlers::predict::PredictResponse,
            services::upload_service::UploadResponse,
        )
    ),
    tags(
        (name = "pages", description = "Frontend HTML pages"),
        (name = "files", description = "Mesh upload"),
        (name = "predict", description = "Surface roughness prediction"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub upload_service: Arc<UploadService>,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Arc<dyn StorageService>) -> Self {
        Self {
            config,
            upload_service: Arc::new(UploadService::new(storage)),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = &state.config;

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(pages::index))
        .route("/viewer", get(pages::viewer))
        .route("/data", get(pages::data_explorer))
        .route("/results", get(pages::results))
        .route("/health", get(health::health_check))
        .route("/api/upload", post(upload::upload_mesh))
        .route("/api/predict", post(predict::predict))
        .nest_service(
            FILES_ROUTE,
            ServiceBuilder::new()
                .layer(from_fn(api::middleware::hidden_files::reject_hidden_files))
                .service(ServeDir::new(&config.upload_dir)),
        )
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .nest_service("/doe_data", ServeDir::new(&config.doe_data_dir))
        .nest_service("/mahr_data", ServeDir::new(&config.mahr_data_dir))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(cors_layer(config))
        .layer(DefaultBodyLimit::max(
            config.max_file_size.saturating_add(MULTIPART_OVERHEAD),
        ))
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
