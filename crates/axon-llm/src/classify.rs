//! Failure classification.

use crate::errors::{AttemptError, ErrorKind, ErrorRecord};

/// Maps raw attempt failures onto the fixed taxonomy.
///
/// Rules are evaluated top to bottom: connectivity, then deadline, then HTTP
/// status, then a final message-text pass. The text pass recognizes provider
/// error strings ("api key", "rate limit", "quota") and by default takes
/// precedence over a status-derived kind, matching the behavior of the
/// service this layer fronts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classifier {
    /// When false, the message-text pass only fills in a kind when no status
    /// rule matched, instead of overriding one.
    pub message_overrides_status: bool,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            message_overrides_status: true,
        }
    }
}

impl Classifier {
    /// Classifies a raw failure. Total: every input produces exactly one
    /// record, falling back to [`ErrorKind::Unknown`]. Pure apart from the
    /// allocation of the record; never touches the transport.
    pub fn classify(&self, cause: AttemptError) -> ErrorRecord {
        let (kind, message, status_code, response_body) = match &cause {
            AttemptError::Transport(err) if err.is_timeout() => (
                ErrorKind::Timeout,
                messages::TIMEOUT.to_string(),
                None,
                None,
            ),
            // A decode failure means a response was obtained; it is not a
            // connectivity problem and retrying will not help.
            AttemptError::Transport(err) if err.is_decode() => (
                ErrorKind::Unknown,
                messages::UNKNOWN.to_string(),
                None,
                None,
            ),
            AttemptError::Transport(_) => (
                ErrorKind::Network,
                messages::NETWORK.to_string(),
                None,
                None,
            ),
            AttemptError::DeadlineExceeded(_) => (
                ErrorKind::Timeout,
                messages::TIMEOUT.to_string(),
                None,
                None,
            ),
            AttemptError::Http {
                status,
                message,
                body,
            } => {
                let status_kind = match *status {
                    401 | 403 => ErrorKind::Auth,
                    429 => ErrorKind::RateLimit,
                    s if s >= 500 => ErrorKind::Server,
                    s if s >= 400 => ErrorKind::Validation,
                    _ => ErrorKind::Unknown,
                };
                let mut kind = status_kind;
                let mut text = status_message(status_kind).to_string();
                if let Some((text_kind, text_message)) = text_rule(message) {
                    if self.message_overrides_status || status_kind == ErrorKind::Unknown {
                        kind = text_kind;
                        text = text_message.to_string();
                    }
                }
                (kind, text, Some(*status), Some(body.clone()))
            }
        };

        ErrorRecord {
            kind,
            message,
            status_code,
            response_body,
            cause: Some(cause),
        }
    }
}

/// Last-chance text matching against the failure message returned by the
/// provider. Runs after the status rules.
fn text_rule(message: &str) -> Option<(ErrorKind, &'static str)> {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("api key") {
        Some((ErrorKind::Auth, messages::AUTH_KEY))
    } else if lowered.contains("rate limit") || lowered.contains("quota") {
        Some((ErrorKind::RateLimit, messages::RATE_LIMIT))
    } else {
        None
    }
}

fn status_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Auth => messages::AUTH,
        ErrorKind::RateLimit => messages::RATE_LIMIT,
        ErrorKind::Server => messages::SERVER,
        ErrorKind::Validation => messages::VALIDATION,
        _ => messages::UNKNOWN,
    }
}

mod messages {
    pub const NETWORK: &str = "connection error; check your network and try again";
    pub const TIMEOUT: &str = "the request took too long and was cancelled";
    pub const AUTH: &str = "authentication failed; check your API key or permissions";
    pub const AUTH_KEY: &str = "invalid or missing API key";
    pub const RATE_LIMIT: &str = "request limit exceeded; try again later";
    pub const SERVER: &str = "the service reported a server error; try again later";
    pub const VALIDATION: &str = "invalid request; check the submitted parameters";
    pub const UNKNOWN: &str = "unknown error";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn http(status: u16, message: &str) -> AttemptError {
        AttemptError::Http {
            status,
            message: message.to_string(),
            body: json!({ "error": { "message": message } }),
        }
    }

    #[test]
    fn deadline_classifies_as_timeout() {
        let record = Classifier::default().classify(AttemptError::DeadlineExceeded(
            Duration::from_secs(30),
        ));
        assert_eq!(record.kind, ErrorKind::Timeout);
        assert_eq!(record.status_code, None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn connection_failure_classifies_as_network() {
        // Port 1 is unassigned locally; the connect is refused without any
        // response being produced.
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .expect_err("connect must fail");
        let record = Classifier::default().classify(AttemptError::Transport(err));
        assert_eq!(record.kind, ErrorKind::Network);
        assert!(record.cause.is_some());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn malformed_success_body_is_not_retried_as_network() {
        use crate::transport::{ChatTransport, OpenAiTransport};
        use crate::types::{ChatPayload, Message};
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\n\
                      content-type: application/json\r\n\
                      content-length: 8\r\n\r\n\
                      not json",
                )
                .await
                .unwrap();
        });

        let payload = ChatPayload {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![Message::user("hi")],
            temperature: 0.7,
            max_tokens: None,
            response_format: None,
        };
        let transport = OpenAiTransport::with_endpoint(format!("http://{addr}/"));
        let err = transport
            .send("key", &payload)
            .await
            .expect_err("body must fail to decode");
        server.await.unwrap();

        let record = Classifier::default().classify(err);
        assert_eq!(record.kind, ErrorKind::Unknown);
        assert!(!record.is_retryable());
    }

    #[test]
    fn status_codes_map_onto_the_taxonomy() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(http(401, "nope")).kind, ErrorKind::Auth);
        assert_eq!(classifier.classify(http(403, "nope")).kind, ErrorKind::Auth);
        assert_eq!(classifier.classify(http(429, "slow down")).kind, ErrorKind::RateLimit);
        assert_eq!(classifier.classify(http(500, "oops")).kind, ErrorKind::Server);
        assert_eq!(classifier.classify(http(503, "oops")).kind, ErrorKind::Server);
        assert_eq!(classifier.classify(http(422, "bad field")).kind, ErrorKind::Validation);
        assert_eq!(classifier.classify(http(400, "bad field")).kind, ErrorKind::Validation);
    }

    #[test]
    fn record_carries_status_and_body() {
        let record = Classifier::default().classify(http(503, "oops"));
        assert_eq!(record.status_code, Some(503));
        assert_eq!(
            record.response_body,
            Some(json!({ "error": { "message": "oops" } }))
        );
    }

    #[test]
    fn message_text_overrides_status_by_default() {
        let classifier = Classifier::default();
        let record = classifier.classify(http(500, "You exceeded your rate limit"));
        assert_eq!(record.kind, ErrorKind::RateLimit);
        let record = classifier.classify(http(500, "Incorrect API key provided"));
        assert_eq!(record.kind, ErrorKind::Auth);
    }

    #[test]
    fn override_can_be_disabled() {
        let classifier = Classifier {
            message_overrides_status: false,
        };
        let record = classifier.classify(http(500, "You exceeded your rate limit"));
        assert_eq!(record.kind, ErrorKind::Server);
        // With no status-derived kind, the text pass still fills in.
        let record = classifier.classify(http(302, "rate limit reached"));
        assert_eq!(record.kind, ErrorKind::RateLimit);
    }

    #[test]
    fn unmatched_failures_fall_back_to_unknown() {
        let record = Classifier::default().classify(http(302, "moved"));
        assert_eq!(record.kind, ErrorKind::Unknown);
    }
}
