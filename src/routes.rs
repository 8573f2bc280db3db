use crate::{AppState, config::Config, errors::AppError, handlers};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::get,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Creates the Axum router and associates routes with handlers.
pub fn create_router(state: Arc<AppState>, config: &Config) -> Result<Router, AppError> {
    let router = Router::new()
        .route(
            "/api/journal",
            get(handlers::list_journals).post(handlers::create_journal),
        )
        .route("/api/journal/today", get(handlers::get_today_journal))
        .route(
            "/api/journal/{id}",
            get(handlers::get_journal)
                .put(handlers::update_journal)
                .delete(handlers::delete_journal),
        )
        // Middleware Layers
        .layer(cors_layer(config.cors_origin.as_deref())?)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(state);

    Ok(router)
}

fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, AppError> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    };

    let origin = HeaderValue::from_str(origin)
        .map_err(|e| AppError::ConfigError(format!("Invalid CORS_ORIGIN '{}': {}", origin, e)))?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods(Any)
        .allow_headers(Any))
}
