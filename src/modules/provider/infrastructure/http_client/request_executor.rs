//! Retrying JSON-over-HTTP executor
//!
//! Every failure mode (transport error, error status, empty or malformed
//! body) is retried under the same [`RetryPolicy`] and finally collapses to
//! `None`, so call sites treat an exhausted request as "nothing found".

use super::retry_policy::{is_error_status, RetryPolicy};
use super::transport::{HttpTransport, TransportError, TransportResponse};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Why a single attempt was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    Transport(TransportError),
    HttpStatus(u16),
    EmptyBody,
    MalformedJson(String),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Transport(e) => write!(f, "{}", e),
            AttemptFailure::HttpStatus(status) => write!(f, "HTTP {}", status),
            AttemptFailure::EmptyBody => write!(f, "empty body"),
            AttemptFailure::MalformedJson(e) => write!(f, "malformed JSON: {}", e),
        }
    }
}

/// Accepts a response only if its status is below 400 (or 600+) and its body
/// is non-empty, non-null JSON.
pub fn validate_response(response: &TransportResponse) -> Result<Value, AttemptFailure> {
    if is_error_status(response.status) {
        return Err(AttemptFailure::HttpStatus(response.status));
    }

    let text = response.body.trim();
    if text.is_empty() {
        return Err(AttemptFailure::EmptyBody);
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Null) => Err(AttemptFailure::EmptyBody),
        Ok(value) => Ok(value),
        Err(e) => Err(AttemptFailure::MalformedJson(e.to_string())),
    }
}

pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
    policy: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>, timeout: Duration, policy: RetryPolicy) -> Self {
        Self {
            transport,
            timeout,
            policy,
        }
    }

    /// [`Self::request_json`] with the policy's retry budget.
    pub async fn get_json(&self, url: &str, context_label: &str) -> Option<Value> {
        self.request_json(url, context_label, self.policy.max_retries)
            .await
    }

    /// GET `url` and parse it as JSON, making up to `max_retries + 1` attempts.
    pub async fn request_json(
        &self,
        url: &str,
        context_label: &str,
        max_retries: u32,
    ) -> Option<Value> {
        let total = RetryPolicy::total_attempts(max_retries);

        for attempt in 0..total {
            debug!(
                "{}: attempt {}/{} GET {}",
                context_label,
                attempt + 1,
                total,
                url
            );

            let request = self.transport.get(url, self.timeout);
            let outcome = match timeout(self.timeout, request).await {
                Ok(Ok(response)) => validate_response(&response),
                Ok(Err(e)) => Err(AttemptFailure::Transport(e)),
                Err(_) => Err(AttemptFailure::Transport(TransportError::Timeout)),
            };

            let failure = match outcome {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            "{} succeeded on attempt {} after {} retries",
                            context_label,
                            attempt + 1,
                            attempt
                        );
                    }
                    return Some(value);
                }
                Err(failure) => failure,
            };

            // Don't wait after the last attempt
            if attempt + 1 < total {
                let delay = self.policy.calculate_delay(attempt + 1);
                debug!(
                    "{} failed on attempt {} ({}), retrying in {:?}",
                    context_label,
                    attempt + 1,
                    failure,
                    delay
                );
                sleep(delay).await;
            } else {
                warn!(
                    "{}: request failed after {} attempts ({}), giving up",
                    context_label, total, failure
                );
            }
        }

        None
    }
}
