use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, Serialize, ToSchema, Clone, Debug)]
pub struct GenerateRequest {
    /// Absent fields behave like empty ones and fail the emptiness checks,
    /// not JSON parsing.
    #[serde(default)]
    #[schema(example = "def add(a, b):\n    return a + b")]
    pub code: String,
    #[serde(default)]
    #[schema(example = "python")]
    pub language: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct GenerateResponse {
    pub documentation: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: String,
    #[schema(example = "1.0.0")]
    pub version: String,
}
