//! # price-search
//!
//! Federated product search: one query, many catalogs, one ranked list.
//!
//! This crate queries several independent product catalogs concurrently,
//! keeps the listings that actually match the query, adds the shipping cost
//! of each source and returns the offers sorted by landed cost.
//!
//! ## Design
//!
//! - One tokio task per catalog; every task settles before results are merged
//! - Bounded retries with linear backoff per catalog, one deadline per search
//! - Token-overlap matching with accessory exclusion and Hebrew synonyms
//! - Static per-source shipping table with a conservative default
//! - Clearly flagged estimates when no catalog yields a relevant listing
//!
//! ## Failure model
//!
//! Catalog failures never fail a search. They are logged, reported per
//! source in [`SearchResponse::sources`], and the search continues with
//! whatever the other catalogs returned. Only caller misuse (an empty or
//! too-short query, invalid [`SearchOptions`]) is returned as an error.
//!
//! ## Security
//!
//! - No API keys or secrets
//! - No network listeners; this is a library, not a server
//! - Search queries are logged only at trace level

pub mod adapter;
pub mod adapters;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

use std::sync::Arc;

pub use adapter::SourceAdapter;
pub use config::SearchOptions;
pub use context::SearchContext;
pub use error::{Result, SearchError};
pub use orchestrator::{SearchStage, ShippingTable};
pub use types::{
    Currency, DeliveryWindow, ProductListing, Query, RankedListing, SearchResponse, ShippingQuote,
    SourceReport, SourceStatus,
};

/// A set of catalogs and the shipping rules applied to their offers.
///
/// Cheap to clone; adapters are shared behind [`Arc`].
#[derive(Clone)]
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    shipping: ShippingTable,
    overrides: Vec<ShippingQuote>,
}

impl Default for Aggregator {
    /// Every built-in catalog with the built-in shipping table.
    fn default() -> Self {
        Self::new(adapters::default_adapters())
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("sources", &self.source_ids())
            .field("shipping_rules", &self.shipping.len())
            .field("overrides", &self.overrides.len())
            .finish()
    }
}

impl Aggregator {
    /// Aggregate over `adapters` with the built-in shipping table.
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            adapters,
            shipping: ShippingTable::default(),
            overrides: Vec::new(),
        }
    }

    /// Register one more catalog.
    pub fn with_adapter(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Replace the base shipping table.
    pub fn with_shipping_table(mut self, table: ShippingTable) -> Self {
        self.shipping = table;
        self
    }

    /// Force a shipping rule, overriding both the table and any terms an
    /// adapter publishes for itself.
    pub fn with_shipping_override(mut self, quote: ShippingQuote) -> Self {
        self.overrides.push(quote);
        self
    }

    /// Ids of the registered catalogs, in fan-out order.
    pub fn source_ids(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.id()).collect()
    }

    /// The shipping rules a search would apply: base table, then adapter
    /// terms, then overrides.
    pub fn effective_shipping(&self) -> ShippingTable {
        let mut table = self.shipping.clone().with_adapter_quotes(&self.adapters);
        for quote in &self.overrides {
            table.insert(quote.clone());
        }
        table
    }

    /// Search every registered catalog for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] if the trimmed query is shorter
    /// than [`types::MIN_QUERY_CHARS`], or [`SearchError::Config`] if
    /// `options` are invalid. Catalog failures are never returned as errors.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> price_search::Result<()> {
    /// let aggregator = price_search::Aggregator::default();
    /// let response = aggregator
    ///     .search("Samsung S25 Ultra", &price_search::SearchOptions::default())
    ///     .await?;
    /// for listing in &response.listings {
    ///     println!("{} {} ({})", listing.total_cost, listing.currency(), listing.source_id());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
        let query = Query::new(query)?;
        self.search_query(&query, options).await
    }

    /// Like [`Aggregator::search`] for an already-built [`Query`] carrying
    /// locale or currency hints.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `options` are invalid.
    pub async fn search_query(
        &self,
        query: &Query,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        let ctx = SearchContext::new(options);
        self.search_with_context(query, options, &ctx).await
    }

    /// Run a search under a caller-owned context, so the caller can cancel
    /// it or share a deadline with other work.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `options` are invalid.
    pub async fn search_with_context(
        &self,
        query: &Query,
        options: &SearchOptions,
        ctx: &SearchContext,
    ) -> Result<SearchResponse> {
        options.validate()?;
        tracing::trace!(query = %query, "searching catalogs");
        let shipping = self.effective_shipping();
        Ok(orchestrator::search::execute(query, &self.adapters, &shipping, options, ctx).await)
    }
}

/// Search every built-in catalog.
///
/// Convenience wrapper around [`Aggregator::search`] on
/// [`Aggregator::default()`].
///
/// # Errors
///
/// Same as [`Aggregator::search`].
pub async fn search(query: &str, options: &SearchOptions) -> Result<SearchResponse> {
    Aggregator::default().search(query, options).await
}

/// Search every built-in catalog with [`SearchOptions::default()`].
///
/// # Errors
///
/// Same as [`Aggregator::search`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> price_search::Result<()> {
/// let response = price_search::search_default("airpods pro").await?;
/// if response.used_fallback {
///     println!("no live offers; showing estimates");
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search_default(query: &str) -> Result<SearchResponse> {
    search(query, &SearchOptions::default()).await
}
