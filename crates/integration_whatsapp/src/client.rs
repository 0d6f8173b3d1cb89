//! WhatsApp gateway client
//!
//! Talks to a WhatsApp Web bridge over its REST API. The bridge holds the
//! linked-device session; requests are scoped to one named instance and
//! authenticated with an `apikey` header.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use domain::ConnectionStatus;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

/// Header carrying the gateway API key
const API_KEY_HEADER: &str = "apikey";

/// WhatsApp gateway errors
#[derive(Debug, Error)]
pub enum WhatsAppError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Gateway rejected credentials: {0}")]
    Unauthorized(String),

    #[error("Missing configuration: {0}")]
    Configuration(String),

    #[error("Unexpected gateway response: {0}")]
    InvalidResponse(String),
}

/// WhatsApp gateway client configuration
#[derive(Debug, Clone)]
pub struct WhatsAppClientConfig {
    /// Gateway base URL (e.g. `http://localhost:8080`)
    pub base_url: String,
    /// Gateway API key
    pub api_key: String,
    /// Instance holding the linked session
    pub instance: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for WhatsAppClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: String::new(),
            instance: "wa-relay".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Result of an account lookup for one number
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NumberCheck {
    /// Whether the number has a WhatsApp account
    pub exists: bool,
    /// Serialized account id, present when the account exists
    #[serde(default)]
    pub jid: Option<String>,
    /// Number as echoed by the gateway
    #[serde(default)]
    pub number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConnectionStateResponse {
    instance: InstanceState,
}

#[derive(Debug, Deserialize)]
struct InstanceState {
    state: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    pairing_code: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckNumbersRequest<'a> {
    numbers: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    number: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMediaRequest<'a> {
    number: &'a str,
    mediatype: &'static str,
    mimetype: &'a str,
    caption: &'a str,
    media: String,
    file_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    key: MessageKey,
}

#[derive(Debug, Deserialize)]
struct MessageKey {
    id: String,
}

/// Client for the WhatsApp gateway REST API
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    client: Client,
    config: WhatsAppClientConfig,
    base_url: String,
}

impl WhatsAppClient {
    /// Create a new gateway client
    pub fn new(config: WhatsAppClientConfig) -> Result<Self, WhatsAppError> {
        if config.base_url.trim().is_empty() {
            return Err(WhatsAppError::Configuration(
                "base_url is required".to_string(),
            ));
        }
        if config.instance.trim().is_empty() {
            return Err(WhatsAppError::Configuration(
                "instance is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Instance this client is bound to
    #[must_use]
    pub fn instance(&self) -> &str {
        &self.config.instance
    }

    fn url(&self, action: &str) -> String {
        format!("{}/{}/{}", self.base_url, action, self.config.instance)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, WhatsAppError> {
        let response = request
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, status);
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(WhatsAppError::Unauthorized(message));
        }
        Err(WhatsAppError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Current connection status of the instance
    #[instrument(skip(self), fields(instance = %self.config.instance))]
    pub async fn connection_state(&self) -> Result<ConnectionStatus, WhatsAppError> {
        let response = self
            .execute(self.client.get(self.url("instance/connectionState")))
            .await?;
        let body: ConnectionStateResponse = response
            .json()
            .await
            .map_err(|e| WhatsAppError::InvalidResponse(e.to_string()))?;

        debug!(state = %body.instance.state, "Gateway connection state");
        Ok(ConnectionStatus::from_gateway(&body.instance.state))
    }

    /// Start the instance session
    ///
    /// Returns the QR payload to scan when the instance is not linked yet.
    #[instrument(skip(self), fields(instance = %self.config.instance))]
    pub async fn connect(&self) -> Result<Option<String>, WhatsAppError> {
        let response = self
            .execute(self.client.get(self.url("instance/connect")))
            .await?;
        // Already-linked instances answer with a state object instead
        let body: ConnectResponse = response.json().await.unwrap_or_default();

        Ok(body
            .code
            .or(body.pairing_code)
            .filter(|code| !code.is_empty()))
    }

    /// Look up WhatsApp accounts for the given numbers
    #[instrument(skip(self, numbers), fields(count = numbers.len()))]
    pub async fn check_numbers(&self, numbers: &[&str]) -> Result<Vec<NumberCheck>, WhatsAppError> {
        let response = self
            .execute(
                self.client
                    .post(self.url("chat/whatsappNumbers"))
                    .json(&CheckNumbersRequest { numbers }),
            )
            .await?;

        response
            .json()
            .await
            .map_err(|e| WhatsAppError::InvalidResponse(e.to_string()))
    }

    /// Send a text message, returning the message id
    #[instrument(skip(self, text), fields(to = %number))]
    pub async fn send_text(&self, number: &str, text: &str) -> Result<String, WhatsAppError> {
        debug!(message_len = text.len(), "Sending text message");
        let response = self
            .execute(
                self.client
                    .post(self.url("message/sendText"))
                    .json(&SendTextRequest { number, text }),
            )
            .await?;

        message_id(response).await
    }

    /// Send a document with a caption, returning the message id
    #[instrument(skip(self, data, caption), fields(to = %number, size = data.len()))]
    pub async fn send_document(
        &self,
        number: &str,
        file_name: &str,
        mime_type: &str,
        data: &[u8],
        caption: &str,
    ) -> Result<String, WhatsAppError> {
        let request = SendMediaRequest {
            number,
            mediatype: "document",
            mimetype: mime_type,
            caption,
            media: STANDARD.encode(data),
            file_name,
        };

        debug!(file_name, "Sending document");
        let response = self
            .execute(
                self.client
                    .post(self.url("message/sendMedia"))
                    .json(&request),
            )
            .await?;

        message_id(response).await
    }
}

async fn message_id(response: Response) -> Result<String, WhatsAppError> {
    let body: SendMessageResponse = response
        .json()
        .await
        .map_err(|e| WhatsAppError::InvalidResponse(e.to_string()))?;
    Ok(body.key.id)
}

/// Best readable message from a gateway error body
fn error_message(body: &str, status: StatusCode) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    };

    let Ok(json) = serde_json::from_str::<Value>(body) else {
        let text = body.trim();
        return if text.is_empty() {
            fallback()
        } else {
            text.to_string()
        };
    };

    let nested = &json["response"]["message"];
    let message = match nested {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        },
        _ => None,
    };

    message
        .or_else(|| json["message"].as_str().map(ToString::to_string))
        .or_else(|| json["error"].as_str().map(ToString::to_string))
        .unwrap_or_else(fallback)
}
