//! Error types for the SMS panel.

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Aggregation error: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Client-caused errors detected before anything is dispatched.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("items inválido")]
    InvalidItems,

    #[error("Quantidade de itens acima do limite: {count} > {max}")]
    TooManyItems { count: usize, max: usize },

    #[error("Nenhum número ou comando para enviar")]
    Empty,

    #[error("Quantidade de números ({recipients}) diferente da de comandos ({commands})")]
    Unbalanced { recipients: usize, commands: usize },
}

/// Machine-readable classification of a single failed send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorKind {
    /// Recipient had no digits after normalization.
    InvalidRecipient,
    /// Message was blank after trimming.
    EmptyMessage,
    /// No provider auth key configured.
    MissingCredentials,
    /// Connect/timeout/body-read failure before a response was classified.
    Transport,
    /// Provider answered with a non-2xx status.
    HttpStatus,
    /// Provider answered 2xx but flagged the send as failed.
    ProviderRejected,
    /// 2xx body that is not JSON (strict mode only).
    UnparsableResponse,
}

impl GatewayErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRecipient => "invalid_recipient",
            Self::EmptyMessage => "empty_message",
            Self::MissingCredentials => "missing_credentials",
            Self::Transport => "transport",
            Self::HttpStatus => "http_status",
            Self::ProviderRejected => "provider_rejected",
            Self::UnparsableResponse => "unparsable_response",
        }
    }

    /// Whether the failure was detected locally, without a network call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidRecipient | Self::EmptyMessage | Self::MissingCredentials
        )
    }
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single send through the messaging provider.
///
/// `details` carries the provider body (or `{"raw": text}` when the body was not
/// JSON) whenever the provider actually answered.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub status: Option<u16>,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            details: None,
        }
    }

    pub fn invalid_recipient() -> Self {
        Self::new(GatewayErrorKind::InvalidRecipient, "Número inválido")
    }

    pub fn empty_message() -> Self {
        Self::new(GatewayErrorKind::EmptyMessage, "Mensagem vazia")
    }

    pub fn missing_credentials() -> Self {
        Self::new(
            GatewayErrorKind::MissingCredentials,
            "COMTELE_AUTH_KEY não configurada",
        )
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The value reported to callers: the provider details when present,
    /// otherwise the message.
    pub fn report(&self) -> serde_json::Value {
        self.details
            .clone()
            .unwrap_or_else(|| serde_json::Value::String(self.message.clone()))
    }
}

/// Invariant violations while reassembling dispatch outcomes.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("Resultados incompletos: esperados {expected}, recebidos {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Resultado duplicado para o índice {index}")]
    DuplicateIndex { index: usize },

    #[error("Índice {index} fora do intervalo para {total} pares")]
    IndexOutOfRange { index: usize, total: usize },
}

/// Generative-text provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("GEMINI_API_KEY não configurada")]
    MissingApiKey,

    #[error("Falha na requisição ao provedor {provider}: {reason}")]
    RequestFailed { provider: String, reason: String },
}

/// Errors surfaced by the HTTP layer as a status code plus `{"error": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("JSON inválido: {0}")]
    MalformedBody(String),

    #[error("{0}")]
    NotFound(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Input(e) => Self::Input(e),
            Error::Gateway(e) => Self::Gateway(e),
            Error::Aggregate(e) => Self::Aggregate(e),
            Error::Llm(e) => Self::Llm(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Input(_) | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Gateway(_) | Self::Aggregate(_) | Self::Llm(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({ "error": self.to_string() });
        if let Self::Input(InputError::Unbalanced {
            recipients,
            commands,
        }) = &self
        {
            body["totalRecipients"] = (*recipients).into();
            body["totalCommands"] = (*commands).into();
        }
        (self.status(), Json(body)).into_response()
    }
}
