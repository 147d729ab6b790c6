//! `POST /api/gemini`: prompt passthrough to the text generator.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{AppState, body_or_default, loose_string};
use crate::error::ApiError;
use crate::llm::DEFAULT_PROMPT;

#[derive(Debug, Default, Deserialize)]
pub(super) struct GeminiRequest {
    #[serde(default)]
    prompt: Option<Value>,
}

pub(super) async fn generate(
    State(state): State<AppState>,
    body: Result<Json<GeminiRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = body_or_default(body)?;
    let prompt = match body.prompt {
        None | Some(Value::Null) => DEFAULT_PROMPT.to_string(),
        Some(value) => loose_string(Some(&value)),
    };

    let text = state.llm.generate(&prompt).await.map_err(|e| {
        warn!(model = state.llm.model_name(), error = %e, "Text generation failed");
        ApiError::from(e)
    })?;
    Ok(Json(serde_json::json!({ "text": text })))
}
