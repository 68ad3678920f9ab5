//! Transport seam for the chat-completions endpoint.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::errors::AttemptError;
use crate::types::{ChatPayload, ChatResponse};

pub const OPENAI_CHAT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// One round trip to the chat-completions endpoint.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends the payload under the given credential. A non-success HTTP
    /// status must surface as [`AttemptError::Http`] carrying the status and
    /// the parsed body; connectivity problems surface as
    /// [`AttemptError::Transport`].
    async fn send(&self, api_key: &str, payload: &ChatPayload)
    -> Result<ChatResponse, AttemptError>;
}

/// Production transport backed by reqwest.
#[derive(Clone, Debug)]
pub struct OpenAiTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl OpenAiTransport {
    pub fn new() -> Self {
        Self::with_endpoint(OPENAI_CHAT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for OpenAiTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for OpenAiTransport {
    async fn send(
        &self,
        api_key: &str,
        payload: &ChatPayload,
    ) -> Result<ChatResponse, AttemptError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Non-JSON error bodies degrade to an empty object.
            let body: Value = response
                .json()
                .await
                .unwrap_or_else(|_| Value::Object(Map::new()));
            return Err(AttemptError::Http {
                status: status.as_u16(),
                message: error_message(status, &body),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// Message for a failed response: the provider's `error.message` when
/// present, otherwise the canonical status reason.
fn error_message(status: StatusCode, body: &Value) -> String {
    body.pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unrecognized status")
                .to_string()
        })
}
