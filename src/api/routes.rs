use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use crate::catalog::{url::STATIC_PREFIX, CatalogService};
use crate::config::Config;

pub struct AppState {
    pub catalog: CatalogService,
    pub config: Config,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let static_files = ServeDir::new(&state.config.static_dir);

    let api_routes = Router::new()
        .route("/languages", get(handlers::list_languages))
        .route(
            "/audio",
            get(handlers::list_audio).post(handlers::create_audio),
        )
        .route(
            "/audio/:key",
            get(handlers::get_audio).delete(handlers::delete_audio),
        )
        .route("/health", get(handlers::health));

    Router::new()
        .route("/", get(handlers::root))
        .nest("/api", api_routes)
        .nest_service(STATIC_PREFIX, static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
