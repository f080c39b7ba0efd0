//! The search pipeline: fan-out, filter, augment (or fall back), rank.
//!
//! ```text
//! Idle -> FanningOut -> Filtering -> Augmenting -> Done
//!                           \-> FallbackSynthesis -/
//! ```
//!
//! Fallback synthesis runs if and only if filtering leaves nothing. The
//! pipeline itself never retries; retries live inside each fan-out branch.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::adapter::SourceAdapter;
use crate::config::SearchOptions;
use crate::context::SearchContext;
use crate::types::{Query, RankedListing, SearchResponse};

use super::fallback::synthesize_with_seed;
use super::fanout;
use super::filter::filter_listings;
use super::retry::RetryPolicy;
use super::shipping::ShippingTable;

/// Where a search currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStage {
    Idle,
    FanningOut,
    Filtering,
    FallbackSynthesis,
    Augmenting,
    Done,
}

impl SearchStage {
    /// The stage that follows this one. `have_listings` only matters when
    /// leaving [`SearchStage::Filtering`].
    pub fn next(self, have_listings: bool) -> Self {
        match self {
            Self::Idle => Self::FanningOut,
            Self::FanningOut => Self::Filtering,
            Self::Filtering if have_listings => Self::Augmenting,
            Self::Filtering => Self::FallbackSynthesis,
            Self::FallbackSynthesis => Self::Augmenting,
            Self::Augmenting | Self::Done => Self::Done,
        }
    }
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FanningOut => "fanning_out",
            Self::Filtering => "filtering",
            Self::FallbackSynthesis => "fallback_synthesis",
            Self::Augmenting => "augmenting",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Ranking order: landed cost, then price, then source and title so that
/// equal offers always come out in the same order.
pub fn compare_ranked(a: &RankedListing, b: &RankedListing) -> Ordering {
    a.total_cost
        .cmp(&b.total_cost)
        .then_with(|| a.price().cmp(&b.price()))
        .then_with(|| a.source_id().cmp(b.source_id()))
        .then_with(|| a.title().cmp(b.title()))
}

/// Sort listings by [`compare_ranked`].
pub fn sort_ranked(listings: &mut [RankedListing]) {
    listings.sort_by(compare_ranked);
}

/// Run one search to completion.
///
/// `options` are assumed valid; the facade validates them. Always returns a
/// response: failed sources show up in [`SearchResponse::sources`], and if
/// no relevant listing survives, estimates are returned instead.
pub async fn execute(
    query: &Query,
    adapters: &[Arc<dyn SourceAdapter>],
    shipping: &ShippingTable,
    options: &SearchOptions,
    ctx: &SearchContext,
) -> SearchResponse {
    let mut stage = SearchStage::Idle;
    let mut advance = |have_listings: bool| {
        stage = stage.next(have_listings);
        tracing::debug!(stage = %stage, "search stage");
        stage
    };

    advance(false);
    let report = fanout::run(query, adapters, RetryPolicy::from_options(options), ctx).await;
    tracing::info!(
        sources = report.sources.len(),
        succeeded = report.succeeded(),
        listings = report.listings.len(),
        "fan-out settled"
    );

    advance(false);
    let relevant = filter_listings(query, report.listings);

    let used_fallback = advance(!relevant.is_empty()) == SearchStage::FallbackSynthesis;
    let listings = if used_fallback {
        let estimates = synthesize_with_seed(query, options.fallback_seed);
        advance(true);
        estimates
    } else {
        relevant
    };

    let mut ranked = shipping.augment(listings);
    sort_ranked(&mut ranked);
    ranked.truncate(options.max_results);
    advance(true);

    SearchResponse {
        listings: ranked,
        used_fallback,
        sources: report.sources,
    }
}
