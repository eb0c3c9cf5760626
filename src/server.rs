use std::net::SocketAddr;
use std::{sync::Arc, time::Duration};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    cleanup::CleanupService,
    completion::CompletionClient,
    config::{Config, LogFormat},
    handlers::AppState,
    rate_limiter::RateLimiter,
    routes::create_router,
};

pub fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into());

    match config.log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer())
                .init();
        }
    }
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting docgen-api server on {}", config.bind_address());

    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
    info!(
        "Rate limiter initialized: {} requests per {} seconds",
        rate_limiter.max_requests(),
        rate_limiter.window_seconds()
    );

    let completion = match &config.completion {
        Some(completion_config) => {
            info!(
                "Completion client configured for deployment: {}",
                completion_config.deployment
            );
            Some(Arc::new(CompletionClient::new(completion_config.clone())?))
        }
        None => {
            warn!(
                "Completion service configuration missing; generation requests will fail until \
                 AZURE_OPENAI_API_KEY, AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_DEPLOYMENT are set"
            );
            None
        }
    };

    let state = AppState { completion };
    let app = create_router(&config, Arc::clone(&rate_limiter), state).layer(
        TraceLayer::new_for_http().on_response(
            |response: &axum::response::Response,
             latency: Duration,
             _span: &tracing::Span| {
                tracing::info!(
                    "response latency: {:?}, status: {}",
                    latency,
                    response.status()
                );
            },
        ),
    );

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    let server_url = config.server_url();
    info!("Server running on {}", server_url);
    info!("OpenAPI docs available at {}/openapi.json", server_url);

    info!("Configuration options:");
    info!("  DOCGEN_HOST: Host to bind to (default: 0.0.0.0)");
    info!("  DOCGEN_PORT or PORT: Port to bind to (default: 8080)");
    info!("  RUST_LOG or DOCGEN_LOG_LEVEL: Log level (default: docgen_api=debug,tower_http=debug)");
    info!("  DOCGEN_LOG_FORMAT: Log format - 'json' or 'text' (default: json)");
    info!("  DOCGEN_CORS_ORIGINS: Comma-separated CORS origins (default: *)");
    info!("  DOCGEN_RATE_LIMIT_MAX_REQUESTS: Requests per window (default: 10)");
    info!("  DOCGEN_RATE_LIMIT_WINDOW_SECONDS: Window size in seconds (default: 60)");
    info!("  DOCGEN_RATE_LIMIT_SWEEP_INTERVAL_SECONDS: Ledger sweep interval (default: 300)");
    info!("  AZURE_OPENAI_API_KEY: Completion service API key (required for generation)");
    info!("  AZURE_OPENAI_ENDPOINT: Completion service endpoint URL (required for generation)");
    info!("  AZURE_OPENAI_DEPLOYMENT: Completion deployment name (required for generation)");

    let mut cleanup_service =
        CleanupService::new(Arc::clone(&rate_limiter), rate_limiter.sweep_interval());
    cleanup_service.start();

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Shutting down docgen-api server");

    Ok(())
}
