//! Bounded cooldown-and-retry policy for transient storefront failures.
//!
//! The storefront rate-limits aggressively; a transient failure is handled
//! by waiting out a fixed cooldown and reissuing the same request. Attempts
//! are capped so a persistent outage surfaces as a terminal error instead
//! of an endless loop.

use std::time::Duration;

use tracing::warn;

use crate::http::{HttpClient, HttpRequest, HttpResponse};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Fixed wait between attempts.
    pub cooldown: Duration,
    /// Total attempt budget, including the first request.
    pub max_attempts: u32,
    /// HTTP status codes considered transient.
    pub retry_on_status: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(60),
            max_attempts: 5,
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Policy with the default transient status set and a custom budget.
    pub fn new(cooldown: Duration, max_attempts: u32) -> Self {
        Self {
            cooldown,
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    pub fn is_transient_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    /// Whether another attempt remains after `attempt` (1-based) failed.
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Terminal outcome of an exhausted or non-retryable request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub attempts: u32,
    pub message: String,
}

/// Issue `request`, waiting out the policy cooldown and reissuing on
/// transient failures, until success or the attempt budget runs out.
///
/// Transient means a status in the policy's retry set or a retryable
/// transport error. Non-transient statuses and non-retryable transport
/// errors fail immediately without burning the remaining budget.
pub async fn fetch_with_retry(
    client: &dyn HttpClient,
    policy: &RetryPolicy,
    request: HttpRequest,
) -> Result<HttpResponse, FetchFailure> {
    let mut attempt = 1u32;
    loop {
        let failure = match client.execute(request.clone()).await {
            Ok(response) if response.is_success() => return Ok(response),
            Ok(response) if policy.is_transient_status(response.status) => {
                format!("status {}", response.status)
            }
            Ok(response) => {
                return Err(FetchFailure {
                    attempts: attempt,
                    message: format!("status {}", response.status),
                })
            }
            Err(error) if error.retryable() => error.message().to_owned(),
            Err(error) => {
                return Err(FetchFailure {
                    attempts: attempt,
                    message: error.message().to_owned(),
                })
            }
        };

        if !policy.should_retry(attempt) {
            return Err(FetchFailure {
                attempts: attempt,
                message: failure,
            });
        }

        warn!(
            url = %request.url,
            attempt,
            cooldown_secs = policy.cooldown.as_secs_f64(),
            failure = %failure,
            "transient request failure, waiting out cooldown"
        );
        tokio::time::sleep(policy.cooldown).await;
        attempt += 1;
    }
}
