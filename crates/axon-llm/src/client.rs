//! Service adapter for resilient chat-completion calls.

use std::sync::Arc;

use crate::errors::{ErrorKind, ErrorRecord, Outcome};
use crate::retry;
use crate::transport::{ChatTransport, OpenAiTransport};
use crate::types::{ChatParams, ChatPayload, ChatResponse};

/// Entry point for chat-completion calls.
///
/// Stateless apart from its transport. Construct one instance and hand it to
/// collaborators; there is no process-wide default.
#[derive(Clone)]
pub struct ChatClient {
    transport: Arc<dyn ChatTransport>,
}

impl ChatClient {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Client talking to the real OpenAI chat endpoint.
    pub fn openai() -> Self {
        Self::new(Arc::new(OpenAiTransport::new()))
    }

    /// Validates parameters, builds the outbound payload, and runs the call
    /// under the retry orchestrator. Every failure comes back as a
    /// classified [`ErrorRecord`]; nothing is raised across this boundary.
    ///
    /// Missing credentials and empty message lists fail fast, before any
    /// transport interaction.
    pub async fn call(&self, params: ChatParams) -> Outcome<ChatResponse> {
        let ChatParams {
            api_key,
            model,
            messages,
            temperature,
            max_tokens,
            response_format,
            options,
        } = params;

        if api_key.trim().is_empty() {
            log::debug!("rejecting chat call without a credential");
            return Err(ErrorRecord::new(ErrorKind::Auth, "API key not provided"));
        }
        if messages.is_empty() {
            log::debug!("rejecting chat call without messages");
            return Err(ErrorRecord::new(
                ErrorKind::Validation,
                "at least one message is required",
            ));
        }

        let payload = ChatPayload {
            model,
            messages,
            temperature,
            max_tokens,
            response_format,
        };

        retry::invoke(
            || {
                let transport = Arc::clone(&self.transport);
                let api_key = api_key.as_str();
                let payload = &payload;
                async move { transport.send(api_key, payload).await }
            },
            &options,
        )
        .await
    }
}
