//! Send endpoints: explicit items, raw line blocks, preview and result.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{AppState, body_or_default, loose_string};
use crate::dispatch::BatchResult;
use crate::error::{ApiError, InputError};
use crate::pairing::{self, DEFAULT_LIMIT, MIN_LIMIT, PREVIEW_LEN, Pair};

/// Body of `POST /api/send-1-1`. Fields are loosely typed so spreadsheet
/// exports (numeric phone numbers, nulls) degrade into per-item failures
/// instead of a rejected request.
#[derive(Debug, Default, Deserialize)]
pub(super) struct SendItemsRequest {
    #[serde(default)]
    items: Option<Value>,
    #[serde(default)]
    sender: Option<Value>,
}

/// Body shared by `POST /api/send-lines` and `POST /api/preview`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct LinesRequest {
    #[serde(default)]
    recipients: String,
    #[serde(default)]
    commands: String,
    #[serde(default)]
    limit: Option<Value>,
    #[serde(default)]
    sender: Option<Value>,
}

/// Requested limit before clamping. Absent means the default; anything that
/// is not a number falls to the minimum.
fn requested_limit(limit: Option<&Value>) -> i64 {
    match limit {
        None | Some(Value::Null) => DEFAULT_LIMIT as i64,
        Some(Value::Number(n)) => n.as_f64().map(|f| f as i64).unwrap_or(MIN_LIMIT as i64),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|f| f as i64)
            .unwrap_or(MIN_LIMIT as i64),
        Some(_) => MIN_LIMIT as i64,
    }
}

fn optional_sender(sender: Option<&Value>) -> Option<String> {
    Some(loose_string(sender)).filter(|s| !s.trim().is_empty())
}

pub(super) async fn send_items(
    State(state): State<AppState>,
    body: Result<Json<SendItemsRequest>, JsonRejection>,
) -> Result<Json<BatchResult>, ApiError> {
    let body = body_or_default(body)?;
    let items = body
        .items
        .as_ref()
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or(InputError::InvalidItems)?;

    let pairs: Vec<Pair> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            Pair::new(
                index,
                loose_string(item.get("to")),
                loose_string(item.get("message")),
            )
        })
        .collect();
    let sender = optional_sender(body.sender.as_ref());

    info!(items = pairs.len(), sender = ?sender, "send-1-1 requested");
    let result = state.session.send_items(pairs, sender.as_deref()).await?;
    Ok(Json(result))
}

pub(super) async fn send_lines(
    State(state): State<AppState>,
    body: Result<Json<LinesRequest>, JsonRejection>,
) -> Result<Json<BatchResult>, ApiError> {
    let body = body_or_default(body)?;
    let pairing = pairing::pair(
        &body.recipients,
        &body.commands,
        requested_limit(body.limit.as_ref()),
    );
    let sender = optional_sender(body.sender.as_ref());

    info!(
        recipients = pairing.total_recipients,
        commands = pairing.total_commands,
        pairs = pairing.pairs.len(),
        "send-lines requested"
    );
    let result = state.session.send_pairing(pairing, sender.as_deref()).await?;
    Ok(Json(result))
}

pub(super) async fn preview(
    body: Result<Json<LinesRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body_or_default(body)?;
    let pairing = pairing::pair(
        &body.recipients,
        &body.commands,
        requested_limit(body.limit.as_ref()),
    );

    Ok(Json(serde_json::json!({
        "totalRecipients": pairing.total_recipients,
        "totalCommands": pairing.total_commands,
        "isBalanced": pairing.is_balanced,
        "shortfall": pairing.shortfall(),
        "count": pairing.pairs.len(),
        "pairs": pairing.preview(PREVIEW_LEN),
    })))
}

pub(super) async fn last_result(
    State(state): State<AppState>,
) -> Result<Json<BatchResult>, ApiError> {
    state
        .session
        .last_result()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Nenhum resultado disponível".to_string()))
}

pub(super) async fn reset(State(state): State<AppState>) -> impl IntoResponse {
    state.session.reset().await;
    Json(serde_json::json!({ "status": "reset" }))
}

pub(super) async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "phase": state.session.phase().await,
        "groupSize": state.session.group_size(),
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn limit_parsing() {
        assert_eq!(requested_limit(None), 50);
        assert_eq!(requested_limit(Some(&Value::Null)), 50);
        assert_eq!(requested_limit(Some(&json!(12))), 12);
        assert_eq!(requested_limit(Some(&json!(12.9))), 12);
        assert_eq!(requested_limit(Some(&json!("30"))), 30);
        assert_eq!(requested_limit(Some(&json!("abc"))), 1);
        assert_eq!(requested_limit(Some(&json!([1]))), 1);
    }

    #[test]
    fn blank_sender_is_dropped() {
        assert_eq!(optional_sender(None), None);
        assert_eq!(optional_sender(Some(&json!("  "))), None);
        assert_eq!(optional_sender(Some(&json!("LWSIM"))).as_deref(), Some("LWSIM"));
    }
}
