//! Plain-text rendering of search responses for the terminal.

use std::fmt::Write as _;

use price_search::{RankedListing, SearchResponse, ShippingQuote, SourceStatus};

const TITLE_WIDTH: usize = 48;

/// Render the ranked listings as a table followed by a per-source summary.
///
/// Estimates are marked with `*` and explained in a footnote.
pub fn render_table(response: &SearchResponse) -> String {
    let mut out = String::new();

    if response.listings.is_empty() {
        out.push_str("No listings found.\n");
    } else {
        let _ = writeln!(
            out,
            "{:>3}  {:>12}  {:>10}  {:>8}  {:<11}  {:<10}  Title",
            "#", "Total", "Price", "Shipping", "Delivery", "Source"
        );
        for (rank, listing) in response.listings.iter().enumerate() {
            let _ = writeln!(out, "{}", row(rank + 1, listing));
        }
    }

    if response.used_fallback {
        out.push_str(
            "\n* No live offers matched. Rows marked * are price estimates, not real offers.\n",
        );
    }

    out.push('\n');
    for report in &response.sources {
        let status = match &report.status {
            SourceStatus::Succeeded { count } => format!("{count} listing(s)"),
            SourceStatus::Failed { reason } => format!("failed: {reason}"),
        };
        let _ = writeln!(
            out,
            "  {:<10}  {status} ({} attempt(s))",
            report.source_id, report.attempts
        );
    }
    out
}

fn row(rank: usize, listing: &RankedListing) -> String {
    let marker = if listing.is_estimate() { "*" } else { " " };
    let shipping = if listing.shipping_eligible() {
        listing.shipping.cost.round_dp(2).to_string()
    } else {
        "n/a".to_string()
    };
    let delivery = listing
        .estimated_days()
        .map(|w| w.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{rank:>3}{marker} {:>8} {}  {:>10}  {:>8}  {:<11}  {:<10}  {}",
        listing.total_cost().round_dp(2),
        listing.currency(),
        listing.price().round_dp(2),
        shipping,
        delivery,
        listing.source_id(),
        truncate(listing.title(), TITLE_WIDTH),
    )
}

/// Render the shipping terms of each configured source.
pub fn render_sources(quotes: &[ShippingQuote]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:<8}  {:>8}  {:<11}  Details",
        "Source", "Ships", "Cost", "Delivery"
    );
    for quote in quotes {
        let delivery = quote
            .estimated_days
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<10}  {:<8}  {:>8}  {:<11}  {}",
            quote.source_id,
            if quote.ships_to_destination { "yes" } else { "no" },
            quote.applied_cost().round_dp(2),
            delivery,
            quote.details
        );
    }
    out
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
