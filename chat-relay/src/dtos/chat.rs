use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Body of `POST /chat`.
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub message: String,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// HTML fragment with exactly one top-level element.
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}
