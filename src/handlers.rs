use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{debug, error, info, warn};
use utoipa::OpenApi;

use crate::api::{ErrorBody, GenerateRequest, GenerateResponse, HealthResponse};
use crate::completion::CompletionClient;
use crate::error::ApiError;
use crate::prompt::build_prompt;

/// Maximum accepted `code` length in characters, checked before sanitization.
pub const MAX_CODE_LENGTH: usize = 10_000;

#[derive(Clone)]
pub struct AppState {
    /// Absent when any of the completion-service environment values is
    /// missing; requests then fail with a configuration error.
    pub completion: Option<Arc<CompletionClient>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(generate_docs, health_check, openapi_json),
    components(
        schemas(GenerateRequest),
        schemas(GenerateResponse),
        schemas(ErrorBody),
        schemas(HealthResponse)
    ),
    tags(
        (name = "docgen-api", description = "Code documentation generation API")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    post,
    path = "/",
    responses(
        (status = 200, description = "Documentation generated successfully", body = GenerateResponse),
        (status = 400, description = "Invalid request body", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody),
        (status = 500, description = "Configuration or generation failure", body = ErrorBody),
    ),
    request_body = GenerateRequest
)]
pub async fn generate_docs(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<GenerateResponse>, ApiError> {
    // Parsed by hand so a bad body maps to the `Invalid JSON` error instead
    // of an extractor rejection.
    let request: GenerateRequest = serde_json::from_str(&body).map_err(|e| {
        warn!("Invalid JSON received: {}", e);
        ApiError::InvalidJson
    })?;

    let code = request.code.trim();
    let language = request.language.trim();

    if code.is_empty() {
        warn!("Empty code received");
        return Err(ApiError::EmptyCode);
    }

    if language.is_empty() {
        warn!("Empty language received");
        return Err(ApiError::EmptyLanguage);
    }

    let code_length = code.chars().count();
    if code_length > MAX_CODE_LENGTH {
        warn!("Code too long: {} characters", code_length);
        return Err(ApiError::CodeTooLong);
    }

    let client = state.completion.as_ref().ok_or_else(|| {
        error!("Missing completion service configuration");
        ApiError::MissingConfiguration
    })?;

    info!(
        "Processing request for {} code ({} characters)",
        language, code_length
    );

    let prompt = build_prompt(language, code);
    let documentation = client.complete(&prompt).await?;
    let documentation = documentation.trim();

    if documentation.is_empty() {
        error!("Empty documentation received from completion API");
        return Err(ApiError::EmptyDocumentation);
    }

    info!(
        "Successfully generated documentation ({} characters)",
        documentation.chars().count()
    );

    Ok(Json(GenerateResponse {
        documentation: documentation.to_string(),
    }))
}

/// Non-preflight OPTIONS requests get an empty 200; the CORS layer fills in
/// the headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> ApiError {
    warn!("Request with unsupported method received");
    ApiError::MethodNotAllowed
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    debug!("GET /health called");

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI specification", body = String),
    )
)]
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    debug!("GET /openapi.json called");
    Json(ApiDoc::openapi())
}
