pub mod api;
pub mod cleanup;
pub mod completion;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod prompt;
pub mod rate_limiter;
pub mod routes;
pub mod sanitize;
pub mod server;

pub use api::{ErrorBody, GenerateRequest, GenerateResponse, HealthResponse};
pub use cleanup::CleanupService;
pub use completion::{CompletionClient, CompletionError};
pub use config::{CompletionConfig, Config};
pub use error::ApiError;
pub use prompt::build_prompt;
pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use sanitize::sanitize;
