//! HTTP API: axum router for the send panel and the text proxy.

mod gemini;
mod send;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::{Method, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::Value;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::dispatch::DispatchSession;
use crate::error::ApiError;
use crate::llm::TextGenerator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<DispatchSession>,
    pub llm: Arc<dyn TextGenerator>,
}

impl AppState {
    pub fn new(session: Arc<DispatchSession>, llm: Arc<dyn TextGenerator>) -> Self {
        Self { session, llm }
    }
}

/// Build the router with CORS applied to every route.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route("/api/send-1-1", post(send::send_items))
        .route("/api/send-lines", post(send::send_lines))
        .route("/api/preview", post(send::preview))
        .route("/api/result", get(send::last_result).delete(send::reset))
        .route("/api/status", get(send::status))
        .route("/api/gemini", post(gemini::generate))
        .layer(cors)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sms-panel"
    }))
}

/// Render a loosely-typed JSON scalar the way a form field would read it.
/// Missing and `null` become the empty string.
fn loose_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Read a JSON body that may be absent. A request without a JSON body reads
/// as the default request; a body that does not parse is a 400 `{error}`.
fn body_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(ApiError::MalformedBody(rejection.body_text())),
    }
}
