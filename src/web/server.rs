use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::predict::TleLoader;

use super::api::catalog as catalog_handlers;
use super::api::screen as screen_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();

    let mut loader = TleLoader::new(config.catalog.tle_source.clone());
    if let Err(e) = loader.load_all() {
        log::warn!("Failed to load TLE catalog: {}", e);
    }

    let state = AppState {
        config: Arc::new(config),
        tle_loader: Arc::new(RwLock::new(loader)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // Catalog API endpoints
        .route("/api/catalog", get(catalog_handlers::list_catalog))
        .route("/api/catalog/reload", post(catalog_handlers::reload_catalog))
        // Screening API endpoints
        .route("/api/screen", get(screen_handlers::screen_catalog))
        .route(
            "/api/screen/{reference}",
            get(screen_handlers::screen_reference),
        )
        .route("/api/track/{satellite}", get(screen_handlers::track))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
