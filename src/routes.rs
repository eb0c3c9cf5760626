use axum::{
    Router,
    http::{Method, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
};

use crate::{
    config::Config,
    error::ApiError,
    handlers::{
        AppState, generate_docs, health_check, method_not_allowed, openapi_json, preflight,
    },
    middleware::rate_limit_middleware,
    rate_limiter::RateLimiter,
};

pub fn create_router(config: &Config, rate_limiter: Arc<RateLimiter>, state: AppState) -> Router {
    let docs_routes = Router::new()
        .route("/", post(generate_docs).options(preflight))
        .route_layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let router = Router::new()
        .merge(docs_routes)
        .route("/health", get(health_check).options(preflight))
        .route("/openapi.json", get(openapi_json))
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state);

    with_outer_layers(router, config)
}

/// CORS is the outermost layer so every response carries the headers,
/// including the 500 substituted when a handler panics.
fn with_outer_layers(router: Router, config: &Config) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(cors_layer(config))
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_methods = [Method::GET, Method::POST, Method::OPTIONS];
    let allowed_headers = [header::CONTENT_TYPE, header::AUTHORIZATION];

    if config.cors_origins.contains(&"*".to_string()) {
        CorsLayer::new()
            .allow_methods(allowed_methods)
            .allow_headers(allowed_headers)
            .allow_origin(AnyOrigin)
    } else {
        let origins: Result<Vec<_>, _> = config
            .cors_origins
            .iter()
            .map(|origin| origin.parse())
            .collect();

        match origins {
            Ok(origins) => CorsLayer::new()
                .allow_methods(allowed_methods)
                .allow_headers(allowed_headers)
                .allow_origin(origins),
            Err(_) => {
                eprintln!("Warning: Invalid CORS origins, falling back to allow all");
                CorsLayer::new()
                    .allow_methods(allowed_methods)
                    .allow_headers(allowed_headers)
                    .allow_origin(AnyOrigin)
            }
        }
    }
}

/// Top-level catch-all: anything that panics inside a handler still answers
/// with the uniform error body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!("Unexpected error: handler panicked: {}", detail);

    ApiError::Internal.into_response()
}
