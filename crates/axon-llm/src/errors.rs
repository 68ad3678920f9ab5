//! Error taxonomy for the call layer.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Uniform result handed back to every caller of this layer.
pub type Outcome<T> = Result<T, ErrorRecord>;

/// Fixed failure taxonomy driving the retry decision.
///
/// Closed and exhaustive: every attempt failure maps to exactly one kind,
/// with [`ErrorKind::Unknown`] as the fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    #[serde(rename = "authentication")]
    Auth,
    RateLimit,
    Timeout,
    Server,
    Validation,
    Unknown,
}

impl ErrorKind {
    /// Kinds presumed transient and eligible for automatic retry.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::Server)
    }

    /// Stable wire name for the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Auth => "authentication",
            Self::RateLimit => "rate_limit",
            Self::Timeout => "timeout",
            Self::Server => "server",
            Self::Validation => "validation",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw failure of a single attempt, before classification.
///
/// Internal to the layer: the public `call`/`invoke` boundary only ever
/// returns [`ErrorRecord`].
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The request never produced a response (connection, DNS, protocol).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The attempt exceeded its deadline and was cancelled.
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: Value,
    },
}

/// Structured, classified representation of a failure.
///
/// Immutable once constructed; created fresh per attempt and discarded after
/// being returned or handed to the error hook.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    pub status_code: Option<u16>,
    pub response_body: Option<Value>,
    /// The raw failure this record was classified from, when one exists.
    #[source]
    pub cause: Option<AttemptError>,
}

impl ErrorRecord {
    /// Builds a record with no status, body, or underlying cause. Used for
    /// failures detected before any attempt runs.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            response_body: None,
            cause: None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
