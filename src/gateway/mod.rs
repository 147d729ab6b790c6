//! Messaging gateway abstraction.
//!
//! A gateway sends one SMS per call and classifies the provider's answer into a
//! [`ProviderResponse`] or a [`GatewayError`]. The dispatch layer only ever sees
//! the [`SmsGateway`] trait, so tests drive it with in-memory fakes.

pub mod comtele;

pub use comtele::ComteleGateway;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::GatewayError;

/// Parsed provider body, or `{"raw": text}` when the body was not JSON.
pub type ProviderResponse = serde_json::Value;

/// Anything that can deliver a single SMS.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Fails when no send can succeed at all (e.g. credentials are missing).
    /// Called once per batch, before anything is dispatched.
    fn check_ready(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    /// Send one message. Exactly one provider call per invocation, no retries.
    async fn send(
        &self,
        recipient: &str,
        message: &str,
        sender: Option<&str>,
    ) -> Result<ProviderResponse, GatewayError>;
}

/// Normalized outbound payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmsRequest {
    #[serde(rename = "Receivers")]
    pub receivers: String,
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "Sender", skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

impl SmsRequest {
    /// Reduce the recipient to digits, trim message and sender.
    ///
    /// A blank sender is dropped rather than sent empty.
    pub fn normalize(
        recipient: &str,
        message: &str,
        sender: Option<&str>,
    ) -> Result<Self, GatewayError> {
        let receivers: String = recipient.chars().filter(char::is_ascii_digit).collect();
        if receivers.is_empty() {
            return Err(GatewayError::invalid_recipient());
        }

        let content = message.trim();
        if content.is_empty() {
            return Err(GatewayError::empty_message());
        }

        let sender = sender
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            receivers,
            content: content.to_string(),
            sender,
        })
    }
}
