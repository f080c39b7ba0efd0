//! Concurrent fan-out across every source adapter.
//!
//! One task is spawned per adapter so a slow or panicking catalog cannot
//! stall or take down its siblings. Every task runs the retry policy under
//! a child of the search context and always settles: success, failure,
//! panic and timeout are all turned into a [`SourceReport`].

use std::sync::Arc;

use crate::adapter::SourceAdapter;
use crate::context::SearchContext;
use crate::error::SearchError;
use crate::types::{AdapterOutcome, ProductListing, Query, SourceReport, SourceStatus};

use super::dedup::dedup_within_sources;
use super::retry::RetryPolicy;

/// Everything the fan-out stage learned.
#[derive(Debug, Clone, Default)]
pub struct FanOutReport {
    /// Valid listings from all sources, same-source duplicates removed.
    pub listings: Vec<ProductListing>,
    /// One report per adapter, in adapter order.
    pub sources: Vec<SourceReport>,
}

impl FanOutReport {
    /// Number of sources that answered successfully.
    pub fn succeeded(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.status, SourceStatus::Succeeded { .. }))
            .count()
    }
}

/// Query every adapter concurrently and wait for all of them to settle.
pub async fn run(
    query: &Query,
    adapters: &[Arc<dyn SourceAdapter>],
    policy: RetryPolicy,
    ctx: &SearchContext,
) -> FanOutReport {
    let handles: Vec<_> = adapters
        .iter()
        .map(|adapter| {
            let adapter = Arc::clone(adapter);
            let query = query.clone();
            let ctx = ctx.child();
            tokio::spawn(async move { policy.run(adapter.as_ref(), &query, &ctx).await })
        })
        .collect();

    let outcomes = futures::future::join_all(handles).await;

    let mut report = FanOutReport::default();
    for (adapter, joined) in adapters.iter().zip(outcomes) {
        let id = adapter.id();
        let outcome = joined.unwrap_or_else(|e| {
            tracing::error!(source = %id, error = %e, "catalog task aborted");
            AdapterOutcome::Failure {
                error: SearchError::Http(format!("{id} task aborted: {e}")),
                attempts: 0,
            }
        });

        let attempts = outcome.attempts();
        let status = match outcome {
            AdapterOutcome::Success { listings, .. } => {
                let valid = accept_listings(id, listings);
                tracing::debug!(source = %id, count = valid.len(), attempts, "catalog answered");
                let count = valid.len();
                report.listings.extend(valid);
                SourceStatus::Succeeded { count }
            }
            AdapterOutcome::Failure { error, .. } => {
                if error.is_interrupted() {
                    tracing::info!(source = %id, attempts, error = %error, "catalog cut off");
                } else {
                    tracing::warn!(source = %id, attempts, error = %error, "catalog failed");
                }
                SourceStatus::Failed {
                    reason: error.to_string(),
                }
            }
        };

        report.sources.push(SourceReport {
            source_id: id.to_string(),
            status,
            attempts,
        });
    }

    report.listings = dedup_within_sources(report.listings);
    report
}

/// Drop listings that break the listing invariants or claim another source.
fn accept_listings(id: &str, listings: Vec<ProductListing>) -> Vec<ProductListing> {
    listings
        .into_iter()
        .filter(|listing| {
            if listing.source_id != id {
                tracing::warn!(
                    source = %id,
                    claimed = %listing.source_id,
                    "dropping listing attributed to another source"
                );
                return false;
            }
            match listing.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(source = %id, error = %e, "dropping invalid listing");
                    false
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::SearchOptions;
    use crate::test_utils::{listing, ScriptedAdapter, Step};
    use rust_decimal_macros::dec;
    use tokio::time::Instant;

    fn ctx(overall_ms: u64) -> SearchContext {
        SearchContext::new(&SearchOptions {
            per_adapter_timeout_ms: overall_ms,
            overall_timeout_ms: overall_ms,
            ..Default::default()
        })
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(2, Duration::from_millis(10), Duration::from_secs(60))
    }

    fn query() -> Query {
        Query::new("galaxy s25").expect("valid query")
    }

    fn status_of<'a>(report: &'a FanOutReport, id: &str) -> &'a SourceStatus {
        &report
            .sources
            .iter()
            .find(|s| s.source_id == id)
            .expect("source reported")
            .status
    }

    #[tokio::test(start_paused = true)]
    async fn every_adapter_settles_and_is_reported() {
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(ScriptedAdapter::returning(
                "KSP",
                vec![listing("KSP", "Galaxy S25", dec!(3500))],
            )),
            Arc::new(ScriptedAdapter::failing("Bug")),
            Arc::new(ScriptedAdapter::returning(
                "Zap",
                vec![
                    listing("Zap", "Galaxy S25", dec!(3400)),
                    listing("Zap", "Galaxy S25 Plus", dec!(3900)),
                ],
            )),
        ];

        let report = run(&query(), &adapters, policy(), &ctx(10_000)).await;

        assert_eq!(report.sources.len(), 3);
        let order: Vec<&str> = report.sources.iter().map(|s| s.source_id.as_str()).collect();
        assert_eq!(order, vec!["KSP", "Bug", "Zap"]);
        assert_eq!(report.listings.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(*status_of(&report, "Zap"), SourceStatus::Succeeded { count: 2 });
        assert!(matches!(status_of(&report, "Bug"), SourceStatus::Failed { .. }));
        assert_eq!(report.sources[1].attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_adapter_does_not_disturb_siblings() {
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(ScriptedAdapter::new("Pilpel", vec![Step::Panic])),
            Arc::new(ScriptedAdapter::returning(
                "Ivory",
                vec![listing("Ivory", "Galaxy S25", dec!(3450))],
            )),
        ];

        let report = run(&query(), &adapters, policy(), &ctx(10_000)).await;

        assert_eq!(report.listings.len(), 1);
        assert_eq!(report.sources[0].attempts, 0);
        assert!(matches!(
            status_of(&report, "Pilpel"),
            SourceStatus::Failed { reason } if reason.contains("aborted")
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_adapter_is_cut_off_at_the_deadline() {
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(ScriptedAdapter::new("WinWin", vec![Step::Hang])),
            Arc::new(ScriptedAdapter::new(
                "Hamashbir",
                vec![Step::Slow(
                    Duration::from_millis(200),
                    vec![listing("Hamashbir", "Galaxy S25", dec!(3300))],
                )],
            )),
        ];

        let start = Instant::now();
        let report = run(&query(), &adapters, policy(), &ctx(1_000)).await;

        assert!(Instant::now() - start <= Duration::from_millis(1_000));
        assert_eq!(report.listings.len(), 1);
        assert!(matches!(
            status_of(&report, "WinWin"),
            SourceStatus::Failed { reason } if reason.starts_with("timed out")
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_and_misattributed_listings_are_dropped() {
        let mut negative = listing("KSP", "Galaxy S25", dec!(10));
        negative.price = dec!(-1);
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(ScriptedAdapter::returning(
            "KSP",
            vec![
                negative,
                listing("Zap", "Galaxy S25", dec!(3400)),
                listing("KSP", "Galaxy S25 Ultra", dec!(4800)),
            ],
        ))];

        let report = run(&query(), &adapters, policy(), &ctx(10_000)).await;

        assert_eq!(report.listings.len(), 1);
        assert_eq!(report.listings[0].title, "Galaxy S25 Ultra");
        assert_eq!(*status_of(&report, "KSP"), SourceStatus::Succeeded { count: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_search_reports_every_source_as_failed() {
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(ScriptedAdapter::new("KSP", vec![Step::Hang])),
            Arc::new(ScriptedAdapter::new("Bug", vec![Step::Hang])),
        ];
        let ctx = ctx(60_000);
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let report = run(&query(), &adapters, policy(), &ctx).await;

        assert!(report.listings.is_empty());
        assert!(report.sources.iter().all(|s| matches!(
            &s.status,
            SourceStatus::Failed { reason } if reason.starts_with("cancelled")
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn no_adapters_yields_empty_report() {
        let report = run(&query(), &[], policy(), &ctx(1_000)).await;
        assert!(report.listings.is_empty());
        assert!(report.sources.is_empty());
    }
}
