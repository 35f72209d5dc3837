//! Outbound WhatsApp messaging via the Meta Cloud API.
//!
//! The server acts as a thin proxy: it normalizes the destination number,
//! injects the bearer credentials from configuration, and relays the remote
//! provider's response (success payload or error message plus status)
//! back to the caller.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::WhatsAppConfig;
use crate::errors::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct TextPayload<'a> {
    preview_url: bool,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct SendPayload<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    message_type: &'static str,
    text: TextPayload<'a>,
}

/// Client for the WhatsApp Cloud send-message endpoint.
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    phone_number_id: String,
}

/// Strip everything but digits, so formatted numbers like
/// `+55 (11) 91234-5678` normalize to `5511912345678`.
pub fn normalize_destination(to: &str) -> String {
    to.chars().filter(char::is_ascii_digit).collect()
}

impl WhatsAppClient {
    /// Build a client from configuration. Fails fast with a configuration
    /// error when credentials are absent, before any network call.
    pub fn from_config(config: &WhatsAppConfig) -> Result<Self, Error> {
        let token = config.token.clone().ok_or_else(|| Error::Configuration {
            message: "WhatsApp credentials are not configured".to_string(),
        })?;
        let phone_number_id =
            config.phone_number_id.clone().ok_or_else(|| Error::Configuration {
                message: "WhatsApp credentials are not configured".to_string(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Internal {
                operation: format!("create WhatsApp HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
            phone_number_id,
        })
    }

    /// Send a text message, returning the provider's response payload.
    ///
    /// Provider-side failures surface as [`Error::Upstream`], carrying the
    /// remote status code and the remote error's message text.
    pub async fn send_text(&self, to: &str, message: &str) -> Result<Value, Error> {
        let destination = normalize_destination(to);
        let url = format!("{}/{}/messages", self.api_base, self.phone_number_id);
        let payload = SendPayload {
            messaging_product: "whatsapp",
            to: &destination,
            message_type: "text",
            text: TextPayload {
                preview_url: false,
                body: message,
            },
        };

        debug!(destination = %destination, "Forwarding WhatsApp message");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Upstream {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: format!("WhatsApp API unreachable: {e}"),
            })?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            Ok(body)
        } else {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("WhatsApp API request failed")
                .to_string();
            warn!(status = %status, message = %message, "WhatsApp send failed");
            Err(Error::Upstream {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(api_base: String) -> WhatsAppConfig {
        WhatsAppConfig {
            api_base,
            token: Some("test-token".to_string()),
            phone_number_id: Some("12345".to_string()),
        }
    }

    #[test]
    fn destination_is_stripped_to_digits() {
        assert_eq!(normalize_destination("+55 (11) 91234-5678"), "5511912345678");
        assert_eq!(normalize_destination("5511912345678"), "5511912345678");
        assert_eq!(normalize_destination("abc"), "");
    }

    #[test]
    fn missing_credentials_fail_before_any_call() {
        let config = WhatsAppConfig {
            api_base: "https://graph.facebook.com/v17.0".to_string(),
            token: None,
            phone_number_id: Some("12345".to_string()),
        };
        let err = WhatsAppClient::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test_log::test(tokio::test)]
    async fn send_posts_the_templated_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/12345/messages"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(json!({
                "messaging_product": "whatsapp",
                "to": "5511912345678",
                "type": "text",
                "text": { "preview_url": false, "body": "hello" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messages": [{ "id": "wamid.123" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = WhatsAppClient::from_config(&config(server.uri())).unwrap();
        let response = client.send_text("+55 (11) 91234-5678", "hello").await.unwrap();
        assert_eq!(response["messages"][0]["id"], "wamid.123");
    }

    #[tokio::test]
    async fn provider_errors_relay_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/12345/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Invalid OAuth access token" }
            })))
            .mount(&server)
            .await;

        let client = WhatsAppClient::from_config(&config(server.uri())).unwrap();
        let err = client.send_text("5511912345678", "hello").await.unwrap_err();
        let Error::Upstream { status, message } = err else {
            panic!("expected upstream error");
        };
        assert_eq!(status, 401);
        assert_eq!(message, "Invalid OAuth access token");
    }

    #[tokio::test]
    async fn non_json_error_bodies_get_a_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/12345/messages"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let client = WhatsAppClient::from_config(&config(server.uri())).unwrap();
        let err = client.send_text("5511912345678", "hi").await.unwrap_err();
        let Error::Upstream { status, message } = err else {
            panic!("expected upstream error");
        };
        assert_eq!(status, 500);
        assert_eq!(message, "WhatsApp API request failed");
    }
}
