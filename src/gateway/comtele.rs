//! Comtele SMS API v2 client.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ProviderResponse, SmsGateway, SmsRequest};
use crate::config::ComteleConfig;
use crate::error::{ConfigError, GatewayError, GatewayErrorKind};

/// Header carrying the Comtele API key.
const AUTH_HEADER: &str = "auth-key";

/// Comtele client. Cheap to share behind an `Arc`; the inner client is pooled.
#[derive(Clone, Debug)]
pub struct ComteleGateway {
    http_client: Client,
    config: ComteleConfig,
}

impl ComteleGateway {
    /// Create a new client with the configured transport timeout.
    pub fn new(config: ComteleConfig) -> Result<Self, ConfigError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl SmsGateway for ComteleGateway {
    fn name(&self) -> &str {
        "comtele"
    }

    fn check_ready(&self) -> Result<(), GatewayError> {
        match self.config.auth_key {
            Some(_) => Ok(()),
            None => Err(GatewayError::missing_credentials()),
        }
    }

    async fn send(
        &self,
        recipient: &str,
        message: &str,
        sender: Option<&str>,
    ) -> Result<ProviderResponse, GatewayError> {
        let auth_key = self
            .config
            .auth_key
            .as_ref()
            .ok_or_else(GatewayError::missing_credentials)?;
        let request = SmsRequest::normalize(recipient, message, sender)?;

        let response = self
            .http_client
            .post(&self.config.url)
            .header(AUTH_HEADER, auth_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                GatewayError::new(GatewayErrorKind::Transport, format!("Erro Comtele: {e}"))
            })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            GatewayError::new(GatewayErrorKind::Transport, format!("Erro Comtele: {e}"))
                .with_status(status)
        })?;

        debug!(status, receivers = %request.receivers, "Comtele responded");
        classify_response(status, &text, self.config.strict_responses)
    }
}

/// Decide whether a provider answer is a success.
///
/// A non-2xx status fails, and so does a 2xx body with `"Success": false`.
/// Non-JSON bodies are kept as `{"raw": text}`; in strict mode a non-JSON 2xx
/// body is a failure too.
pub fn classify_response(
    status: u16,
    body: &str,
    strict: bool,
) -> Result<ProviderResponse, GatewayError> {
    let (data, parsed) = match serde_json::from_str::<Value>(body) {
        Ok(value) => (value, true),
        Err(_) => (serde_json::json!({ "raw": body }), false),
    };

    if !(200..300).contains(&status) {
        return Err(failure(GatewayErrorKind::HttpStatus, status, data));
    }

    if data.get("Success") == Some(&Value::Bool(false)) {
        return Err(failure(GatewayErrorKind::ProviderRejected, status, data));
    }

    if !parsed {
        if strict {
            return Err(failure(GatewayErrorKind::UnparsableResponse, status, data));
        }
        warn!(status, "Comtele returned a non-JSON success body; accepting as sent");
    }

    Ok(data)
}

fn failure(kind: GatewayErrorKind, status: u16, details: Value) -> GatewayError {
    GatewayError::new(kind, format!("Erro Comtele ({status})"))
        .with_status(status)
        .with_details(details)
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;

    #[test]
    fn success_body_is_returned() {
        let body = r#"{"Success": true, "Object": {"requestUniqueId": "abc"}}"#;
        let data = classify_response(200, body, false).unwrap();
        assert_eq!(data["Object"]["requestUniqueId"], "abc");
    }

    #[test]
    fn success_flag_false_fails_despite_200() {
        let body = r#"{"Success": false, "Message": "blocked"}"#;
        let err = classify_response(200, body, false).unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::ProviderRejected);
        assert_eq!(err.status, Some(200));
        assert_eq!(
            err.details,
            Some(json!({"Success": false, "Message": "blocked"}))
        );
    }

    #[test]
    fn non_success_status_keeps_raw_body() {
        let err = classify_response(502, "<html>Bad Gateway</html>", false).unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::HttpStatus);
        assert_eq!(err.message, "Erro Comtele (502)");
        assert_eq!(err.details, Some(json!({"raw": "<html>Bad Gateway</html>"})));
    }

    #[test]
    fn non_json_success_is_lenient_by_default() {
        let data = classify_response(200, "OK", false).unwrap();
        assert_eq!(data, json!({"raw": "OK"}));
    }

    #[test]
    fn non_json_success_fails_in_strict_mode() {
        let err = classify_response(200, "OK", true).unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::UnparsableResponse);
        assert_eq!(err.details, Some(json!({"raw": "OK"})));
    }

    #[test]
    fn success_flag_must_be_literal_false() {
        assert!(classify_response(200, r#"{"Success": null}"#, false).is_ok());
        assert!(classify_response(200, r#"[1, 2]"#, false).is_ok());
    }

    // Port 9 (discard) on localhost: any attempted connection would fail with
    // a Transport error, so a local-kind error proves no request was made.
    fn unreachable_config(auth_key: Option<&str>) -> ComteleConfig {
        ComteleConfig::new(auth_key.map(SecretString::from)).with_url("http://127.0.0.1:9/send")
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_network() {
        let gateway = ComteleGateway::new(unreachable_config(None)).unwrap();
        assert!(gateway.check_ready().is_err());

        let err = gateway.send("5511999999999", "hi", None).await.unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::MissingCredentials);
    }

    #[tokio::test]
    async fn invalid_recipient_fails_before_network() {
        let gateway = ComteleGateway::new(unreachable_config(Some("key"))).unwrap();
        assert!(gateway.check_ready().is_ok());

        let err = gateway.send("abc", "hi", None).await.unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::InvalidRecipient);
        assert!(err.to_string().contains("inválido"));
    }

    #[tokio::test]
    async fn empty_message_fails_before_network() {
        let gateway = ComteleGateway::new(unreachable_config(Some("key"))).unwrap();
        let err = gateway.send("5511", "   ", None).await.unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::EmptyMessage);
    }
}
