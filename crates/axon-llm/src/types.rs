//! Chat-completion request and response types.

use serde::{Deserialize, Serialize};

use crate::retry::CallOptions;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// A single chat message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// Requested response format, passed through to the service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format: "json_object".to_string(),
        }
    }
}

/// Parameters for one chat-completion call.
///
/// `options.max_retries` defaults to 1 at this layer; the generic
/// orchestrator default stays 0.
#[derive(Debug)]
pub struct ChatParams {
    pub api_key: String,
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub response_format: Option<ResponseFormat>,
    pub options: CallOptions,
}

impl ChatParams {
    pub fn new(api_key: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            response_format: None,
            options: CallOptions::default().with_max_retries(1),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }
}

/// Outbound request body. Optional fields are omitted entirely when unset,
/// never serialized as null.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatPayload {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Parsed success response from the chat endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: Message,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl ChatResponse {
    /// Content of the first choice, the field virtually every caller reads.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.message.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_apply_the_service_defaults() {
        let params = ChatParams::new("key", vec![Message::user("hi")]);
        assert_eq!(params.model, DEFAULT_MODEL);
        assert_eq!(params.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(params.max_tokens, None);
        assert_eq!(params.options.max_retries, 1);
    }

    #[test]
    fn unset_optional_fields_are_omitted_from_the_payload() {
        let payload = ChatPayload {
            model: DEFAULT_MODEL.to_string(),
            messages: vec![Message::user("hi")],
            temperature: 0.7,
            max_tokens: None,
            response_format: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("max_tokens"));
        assert!(!object.contains_key("response_format"));
    }

    #[test]
    fn set_optional_fields_are_serialized() {
        let payload = ChatPayload {
            model: DEFAULT_MODEL.to_string(),
            messages: vec![Message::user("hi")],
            temperature: 0.2,
            max_tokens: Some(256),
            response_format: Some(ResponseFormat::json_object()),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["max_tokens"], json!(256));
        assert_eq!(value["response_format"], json!({ "type": "json_object" }));
    }

    #[test]
    fn response_exposes_the_first_choice_content() {
        let response: ChatResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "model": "gpt-3.5-turbo",
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": "hello" },
                    "finish_reason": "stop"
                }
            ],
            "usage": { "prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7 }
        }))
        .unwrap();

        assert_eq!(response.first_content(), Some("hello"));
        assert_eq!(response.usage.unwrap().total_tokens, 7);
    }

    #[test]
    fn empty_response_has_no_content() {
        let response = ChatResponse::default();
        assert_eq!(response.first_content(), None);
    }
}
