//! Search options with sensible defaults.
//!
//! [`SearchOptions`] is passed per call rather than held globally, so every
//! retry count and deadline is explicit and tests can shrink them freely.
//! The defaults follow the tolerances of the public catalogs: two attempts,
//! a one-second linear backoff step and fifteen seconds per catalog.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Upper bound on attempts per catalog; anything above this only delays
/// the inevitable failure past any reasonable deadline.
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Options controlling a single search.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Attempts per catalog, including the first one.
    pub max_attempts: u32,
    /// Base of the linear backoff: the wait after attempt `k` is
    /// `retry_base_delay_ms * k`.
    pub retry_base_delay_ms: u64,
    /// Time limit for a single attempt against one catalog.
    pub per_adapter_timeout_ms: u64,
    /// Deadline for the whole search, shared by every catalog.
    pub overall_timeout_ms: u64,
    /// Maximum number of ranked listings returned.
    pub max_results: usize,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Seed for estimate pricing. `None` draws from the thread RNG.
    pub fallback_seed: Option<u64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            retry_base_delay_ms: 1_000,
            per_adapter_timeout_ms: 15_000,
            overall_timeout_ms: 30_000,
            max_results: 20,
            user_agent: None,
            fallback_seed: None,
        }
    }
}

impl SearchOptions {
    /// Validates these options, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_attempts` must be between 1 and [`MAX_ATTEMPTS_LIMIT`]
    /// - `per_adapter_timeout_ms` and `overall_timeout_ms` must be greater than 0
    /// - `per_adapter_timeout_ms` must be <= `overall_timeout_ms`
    /// - `max_results` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_attempts == 0 {
            return Err(SearchError::Config(
                "max_attempts must be greater than 0".into(),
            ));
        }
        if self.max_attempts > MAX_ATTEMPTS_LIMIT {
            return Err(SearchError::Config(format!(
                "max_attempts must be at most {MAX_ATTEMPTS_LIMIT}"
            )));
        }
        if self.per_adapter_timeout_ms == 0 {
            return Err(SearchError::Config(
                "per_adapter_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.overall_timeout_ms == 0 {
            return Err(SearchError::Config(
                "overall_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.per_adapter_timeout_ms > self.overall_timeout_ms {
            return Err(SearchError::Config(
                "per_adapter_timeout_ms must be <= overall_timeout_ms".into(),
            ));
        }
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn per_adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.per_adapter_timeout_ms)
    }

    pub fn overall_timeout(&self) -> Duration {
        Duration::from_millis(self.overall_timeout_ms)
    }
}
