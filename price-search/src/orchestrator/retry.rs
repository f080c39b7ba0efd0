//! Bounded retry with linear backoff around a single adapter.
//!
//! Attempts run strictly one after another. The wait after attempt `k` is
//! `base_delay * k`; catalogs are rate-limited by the remote site, so a
//! gentle linear step is enough. Failure is returned as an
//! [`AdapterOutcome::Failure`] value, never raised, so one unavailable
//! catalog cannot disturb its siblings.

use std::time::Duration;

use tokio::time::Instant;

use crate::adapter::SourceAdapter;
use crate::config::SearchOptions;
use crate::context::SearchContext;
use crate::error::SearchError;
use crate::types::{AdapterOutcome, Query};

/// Retry settings for one adapter invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    attempt_timeout: Duration,
}

impl RetryPolicy {
    /// Build a policy. `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, base_delay: Duration, attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            attempt_timeout,
        }
    }

    pub fn from_options(options: &SearchOptions) -> Self {
        Self::new(
            options.max_attempts,
            options.retry_base_delay(),
            options.per_adapter_timeout(),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait between attempt `attempt` (1-based) and the next one.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Run `adapter` until it succeeds, attempts run out, or `ctx` is
    /// cancelled or expires.
    pub async fn run(
        &self,
        adapter: &dyn SourceAdapter,
        query: &Query,
        ctx: &SearchContext,
    ) -> AdapterOutcome {
        let id = adapter.id();
        let mut last_error: Option<SearchError> = None;

        for attempt in 1..=self.max_attempts {
            if let Some(error) = interruption(id, ctx) {
                return AdapterOutcome::Failure {
                    error,
                    attempts: attempt - 1,
                };
            }

            let limit = self.attempt_timeout.min(ctx.remaining());
            tracing::trace!(source = id, attempt, max = self.max_attempts, "catalog attempt");

            let result = match tokio::time::timeout(limit, ctx.guard(id, adapter.fetch(query, ctx)))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(SearchError::Timeout(format!(
                    "{id} attempt {attempt} exceeded {}ms",
                    limit.as_millis()
                ))),
            };

            match result {
                Ok(listings) => {
                    return AdapterOutcome::Success {
                        listings,
                        attempts: attempt,
                    };
                }
                Err(error) => {
                    if let Some(interrupted) = interruption(id, ctx) {
                        return AdapterOutcome::Failure {
                            error: interrupted,
                            attempts: attempt,
                        };
                    }
                    tracing::debug!(
                        source = id,
                        attempt,
                        max = self.max_attempts,
                        error = %error,
                        "catalog attempt failed"
                    );
                    last_error = Some(error);
                }
            }

            if attempt < self.max_attempts {
                let delay = self.delay_after(attempt);
                if Instant::now() + delay >= ctx.deadline() {
                    return AdapterOutcome::Failure {
                        error: SearchError::Timeout(format!(
                            "{id}: no time left to retry after {attempt} attempt(s)"
                        )),
                        attempts: attempt,
                    };
                }
                tokio::select! {
                    biased;
                    _ = ctx.cancelled() => {
                        return AdapterOutcome::Failure {
                            error: SearchError::Cancelled(format!("{id} cancelled during backoff")),
                            attempts: attempt,
                        };
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        AdapterOutcome::Failure {
            error: last_error.unwrap_or_else(|| {
                SearchError::Http(format!("{id} failed without an error"))
            }),
            attempts: self.max_attempts,
        }
    }
}

/// The error to report if `ctx` no longer allows work, or `None`.
fn interruption(id: &str, ctx: &SearchContext) -> Option<SearchError> {
    if ctx.is_cancelled() {
        Some(SearchError::Cancelled(format!("{id} cancelled")))
    } else if ctx.is_expired() {
        Some(SearchError::Timeout(format!(
            "{id} exceeded the search deadline"
        )))
    } else {
        None
    }
}
