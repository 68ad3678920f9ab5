//! Retry orchestration over bounded attempts.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::classify::Classifier;
use crate::errors::{AttemptError, ErrorRecord, Outcome};
use crate::executor;

/// Default per-attempt deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Callback notified of every classified failure, synchronously, before the
/// retry decision. A panic inside the hook propagates to the caller.
pub type ErrorHook = Box<dyn Fn(&ErrorRecord) + Send + Sync>;

/// Per-invocation configuration.
///
/// Never mutated by the orchestrator: the remaining retry budget lives in a
/// local counter, so one invocation cannot leak state into another.
pub struct CallOptions {
    /// Deadline applied to each individual attempt.
    pub timeout: Duration,
    /// Retries on top of the initial attempt. Only retryable kinds consume
    /// the budget; retries are immediate, with no backoff.
    pub max_retries: u32,
    pub on_error: Option<ErrorHook>,
    pub classifier: Classifier,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: 0,
            on_error: None,
            classifier: Classifier::default(),
        }
    }
}

impl fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("on_error", &self.on_error.is_some())
            .field("classifier", &self.classifier)
            .finish()
    }
}

impl CallOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_on_error(mut self, hook: impl Fn(&ErrorRecord) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }
}

/// Runs attempts until success, a terminal failure kind, or an exhausted
/// retry budget — at most `max_retries + 1` attempts.
///
/// `make_attempt` builds a fresh future per iteration, so every attempt gets
/// its own deadline and cancellation scope; an expired deadline never leaks
/// into the next attempt. The error hook for attempt N completes before
/// attempt N+1 starts.
pub async fn invoke<T, F, Fut>(mut make_attempt: F, options: &CallOptions) -> Outcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let mut remaining = options.max_retries;
    loop {
        match executor::bounded(make_attempt(), options.timeout).await {
            Ok(data) => return Ok(data),
            Err(cause) => {
                let record = options.classifier.classify(cause);
                if let Some(hook) = &options.on_error {
                    hook(&record);
                }
                if remaining > 0 && record.is_retryable() {
                    remaining -= 1;
                    log::warn!(
                        "retrying after {} failure ({} retries left)",
                        record.kind,
                        remaining
                    );
                    continue;
                }
                return Err(record);
            }
        }
    }
}
