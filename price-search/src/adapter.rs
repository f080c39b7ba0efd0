//! Trait definition for pluggable product catalog sources.
//!
//! Each external catalog (a marketplace, a regional retailer) implements
//! [`SourceAdapter`] to provide a uniform interface for querying and
//! normalising its results.

use async_trait::async_trait;

use crate::context::SearchContext;
use crate::error::SearchError;
use crate::types::{ProductListing, Query, ShippingQuote};

/// A pluggable product catalog.
///
/// Implementors fetch one catalog's search results and normalise them into
/// [`ProductListing`] values. Each adapter handles its own:
///
/// - URL construction with query encoding
/// - HTTP request with appropriate headers
/// - Response parsing
///
/// Adapters must not retry internally; the orchestrator owns the retry
/// policy. They must observe `ctx` and return promptly once it is cancelled
/// or its deadline passes ([`SearchContext::guard`] does both).
///
/// All implementations must be `Send + Sync` for concurrent fan-out.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier of this source, used as `source_id` on every
    /// listing it produces and as the shipping table key.
    fn id(&self) -> &str;

    /// Search the catalog for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, the response cannot be
    /// parsed, or the context is cancelled or expires.
    async fn fetch(
        &self,
        query: &Query,
        ctx: &SearchContext,
    ) -> Result<Vec<ProductListing>, SearchError>;

    /// Shipping terms this source publishes itself, if any. Consulted
    /// before the static shipping table.
    fn shipping_quote(&self) -> Option<ShippingQuote> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchOptions;
    use crate::types::Currency;
    use rust_decimal_macros::dec;

    /// A mock adapter for testing trait bounds and async execution.
    struct MockAdapter {
        id: &'static str,
        listings: Vec<ProductListing>,
    }

    #[async_trait]
    impl SourceAdapter for MockAdapter {
        fn id(&self) -> &str {
            self.id
        }

        async fn fetch(
            &self,
            _query: &Query,
            ctx: &SearchContext,
        ) -> Result<Vec<ProductListing>, SearchError> {
            let listings = self.listings.clone();
            ctx.guard(self.id, async move {
                if listings.is_empty() {
                    return Err(SearchError::Parse("mock adapter failure".into()));
                }
                Ok(listings)
            })
            .await
        }
    }

    fn mock(listings: Vec<ProductListing>) -> MockAdapter {
        MockAdapter {
            id: "Mock",
            listings,
        }
    }

    #[test]
    fn adapter_is_object_safe_and_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SourceAdapter>();
        let boxed: Box<dyn SourceAdapter> = Box::new(mock(vec![]));
        assert_eq!(boxed.id(), "Mock");
    }

    #[tokio::test]
    async fn mock_adapter_returns_listings() {
        let listing = ProductListing::new(
            "Sony WH-1000XM5",
            dec!(1199),
            Currency::Ils,
            "Mock",
            "https://mock.example/1",
        );
        let adapter = mock(vec![listing]);
        let query = Query::new("sony").expect("valid query");
        let ctx = SearchContext::new(&SearchOptions::default());

        let listings = adapter.fetch(&query, &ctx).await.expect("should succeed");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "Sony WH-1000XM5");
    }

    #[tokio::test]
    async fn mock_adapter_propagates_errors() {
        let adapter = mock(vec![]);
        let query = Query::new("sony").expect("valid query");
        let ctx = SearchContext::new(&SearchOptions::default());

        let result = adapter.fetch(&query, &ctx).await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("mock adapter failure"));
    }

    #[test]
    fn default_shipping_quote_is_none() {
        assert!(mock(vec![]).shipping_quote().is_none());
    }
}
