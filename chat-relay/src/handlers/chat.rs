use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{ChatRequest, ChatResponse};
use crate::services::formatter::{escape_html, format_response, render_format_fallback};
use crate::services::Generation;
use crate::startup::AppState;

pub const INVALID_MESSAGE_ERROR: &str = "'message' must be a non-empty string";
pub const NOT_JSON_ERROR: &str = "Request must be JSON";
pub const BODY_TOO_LARGE_ERROR: &str = "Request body is too large";
pub const UNREADABLE_BODY_ERROR: &str = "Request body could not be read";
pub const EMPTY_RESPONSE_HTML: &str = "<i>Received empty response from AI.</i>";

/// How much of the user message goes into log lines.
const LOG_PREVIEW_CHARS: usize = 50;

#[tracing::instrument(skip(state, payload))]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let request = parse_request(payload)?;
    let preview = preview(&request.message);

    tracing::info!(
        model = %state.text_provider.model(),
        message_len = request.message.len(),
        message_preview = %preview,
        "Generating reply"
    );

    let generation = match state.text_provider.generate(&request.message).await {
        Ok(generation) => generation,
        Err(e) => {
            let kind = e.kind();
            return Err(AppError::InternalError(anyhow::Error::new(e).context(
                format!(
                    "generation failed ({}) for message starting with {:?}",
                    kind, preview
                ),
            )));
        }
    };

    let html = match generation {
        Generation::Generated(text) => match format_response(&text) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to escaped reply");
                render_format_fallback(&text)
            }
        },
        Generation::Blocked(reason) => {
            tracing::info!(block_reason = %reason, "Reply blocked by provider");
            format!("<i>Blocked: {}</i>", escape_html(&reason))
        }
        Generation::Empty => {
            tracing::warn!("Provider returned an empty reply");
            EMPTY_RESPONSE_HTML.to_string()
        }
    };

    Ok(Json(ChatResponse { response: html }))
}

/// Turn the raw body into a validated request.
///
/// A body that is not JSON at all (wrong content type or unparseable) is a
/// 415; JSON of the wrong shape is a 400. A body over the extractor limit is
/// a 413 and any other body read failure a 400, each with its own message.
fn parse_request(payload: Result<Json<Value>, JsonRejection>) -> Result<ChatRequest, AppError> {
    let Json(body) = payload.map_err(|rejection| match rejection {
        JsonRejection::MissingJsonContentType(_) | JsonRejection::JsonSyntaxError(_) => {
            tracing::warn!(rejection = %rejection, "Rejected non-JSON chat request");
            AppError::UnsupportedMediaType(NOT_JSON_ERROR.to_string())
        }
        other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(rejection = %other, "Rejected oversized chat request");
            AppError::PayloadTooLarge(BODY_TOO_LARGE_ERROR.to_string())
        }
        other => {
            tracing::warn!(rejection = %other, "Rejected unreadable chat request");
            AppError::BadRequest(anyhow::anyhow!(UNREADABLE_BODY_ERROR))
        }
    })?;

    let request: ChatRequest = serde_json::from_value(body).map_err(|e| {
        tracing::warn!(error = %e, "Chat request has no usable 'message'");
        AppError::BadRequest(anyhow::anyhow!(INVALID_MESSAGE_ERROR))
    })?;

    request.validate().map_err(|e| {
        tracing::warn!(error = %e, "Chat request has a blank 'message'");
        AppError::BadRequest(anyhow::anyhow!(INVALID_MESSAGE_ERROR))
    })?;

    Ok(request)
}

fn preview(message: &str) -> String {
    let mut preview: String = message.chars().take(LOG_PREVIEW_CHARS).collect();
    if message.chars().nth(LOG_PREVIEW_CHARS).is_some() {
        preview.push_str("...");
    }
    preview
}
