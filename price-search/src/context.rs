//! Cancellation and deadline carried through a single search.
//!
//! A [`SearchContext`] is created once per search and handed to every
//! adapter task and every retry wait. It bundles a [`CancellationToken`]
//! with the absolute deadline of the whole search, so any suspension point
//! can bail out cooperatively when either fires.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::SearchOptions;
use crate::error::SearchError;

/// Per-search cancellation signal, deadline and request settings.
#[derive(Debug, Clone)]
pub struct SearchContext {
    cancel: CancellationToken,
    deadline: Instant,
    attempt_timeout: Duration,
    user_agent: Option<String>,
}

impl SearchContext {
    /// Build a context whose deadline is `options.overall_timeout()` from now.
    pub fn new(options: &SearchOptions) -> Self {
        Self::with_deadline(options, Instant::now() + options.overall_timeout())
    }

    /// Build a context with an explicit deadline.
    pub fn with_deadline(options: &SearchOptions, deadline: Instant) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline,
            attempt_timeout: options.per_adapter_timeout(),
            user_agent: options.user_agent.clone(),
        }
    }

    /// A context sharing this deadline whose token is cancelled together
    /// with the parent but can also be cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
            attempt_timeout: self.attempt_timeout,
            user_agent: self.user_agent.clone(),
        }
    }

    /// Cancel every adapter task observing this context.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Time limit for one attempt, never beyond the overall deadline.
    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout.min(self.remaining())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Run `fut` until it completes, the context is cancelled, or the
    /// overall deadline passes, whichever comes first.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cancelled`] or [`SearchError::Timeout`] when
    /// interrupted; otherwise whatever `fut` returns.
    pub async fn guard<T, F>(&self, what: &str, fut: F) -> Result<T, SearchError>
    where
        F: Future<Output = Result<T, SearchError>>,
    {
        if self.is_cancelled() {
            return Err(SearchError::Cancelled(format!("{what} cancelled")));
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                Err(SearchError::Cancelled(format!("{what} cancelled")))
            }
            _ = tokio::time::sleep_until(self.deadline) => {
                Err(SearchError::Timeout(format!("{what} exceeded the search deadline")))
            }
            result = fut => result,
        }
    }
}
