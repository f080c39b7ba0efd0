//! pricehound: find the cheapest landed price for a product.
//!
//! A thin host around [`price_search`]: it loads the user's configuration,
//! builds the aggregator it describes, applies command-line overrides and
//! renders responses for the terminal.

pub mod config;
pub mod error;
pub mod report;

use price_search::{Currency, Query, SearchOptions, SearchResponse, ShippingQuote};

pub use config::{HoundConfig, ShippingRule};
pub use error::{HoundError, Result};

/// Per-invocation adjustments on top of the configured search options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOverrides {
    pub max_attempts: Option<u32>,
    /// Overall deadline. The per-catalog timeout is capped to fit inside it.
    pub timeout_ms: Option<u64>,
    pub currency: Option<Currency>,
}

impl SearchOverrides {
    /// Options with these overrides applied.
    pub fn apply(&self, base: &SearchOptions) -> SearchOptions {
        let mut options = base.clone();
        if let Some(attempts) = self.max_attempts {
            options.max_attempts = attempts;
        }
        if let Some(timeout) = self.timeout_ms {
            options.overall_timeout_ms = timeout;
            options.per_adapter_timeout_ms = options.per_adapter_timeout_ms.min(timeout);
        }
        options
    }
}

/// Search the sources in `config` for `text`.
///
/// # Errors
///
/// Returns an error if the configuration, the overrides or the query are
/// invalid. Catalog failures are reported inside the response instead.
pub async fn run_search(
    config: &HoundConfig,
    text: &str,
    overrides: &SearchOverrides,
) -> Result<SearchResponse> {
    let aggregator = config.build_aggregator()?;
    let options = overrides.apply(&config.search);
    let mut query = Query::new(text)?;
    if let Some(currency) = overrides.currency {
        query = query.with_currency(currency);
    }
    tracing::info!(sources = aggregator.source_ids().len(), "starting search");
    Ok(aggregator.search_query(&query, &options).await?)
}

/// The shipping terms applied to every configured source.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn source_quotes(config: &HoundConfig) -> Result<Vec<ShippingQuote>> {
    let aggregator = config.build_aggregator()?;
    let table = aggregator.effective_shipping();
    Ok(aggregator
        .source_ids()
        .into_iter()
        .map(|id| table.quote_for(id))
        .collect())
}
