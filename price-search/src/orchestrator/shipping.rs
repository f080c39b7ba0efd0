//! Landed-cost augmentation from a per-source shipping table.
//!
//! Quotes are looked up, never computed. Sources missing from the table
//! get [`ShippingTable::default_quote`]: assumed reachable at a
//! conservative cost with a wide delivery window. Dropping them instead
//! would silently shrink coverage whenever a new source is added without
//! a rule.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::adapter::SourceAdapter;
use crate::types::{DeliveryWindow, ProductListing, RankedListing, ShippingQuote};

/// Cost charged for sources without a configured rule.
pub const DEFAULT_SHIPPING_COST: Decimal = dec!(15);

/// Delivery window assumed for sources without a configured rule.
pub const DEFAULT_DELIVERY_WINDOW: DeliveryWindow = DeliveryWindow {
    min_days: 7,
    max_days: 21,
};

/// Shipping rules keyed by lower-cased source id.
#[derive(Debug, Clone)]
pub struct ShippingTable {
    rules: HashMap<String, ShippingQuote>,
}

impl Default for ShippingTable {
    /// The built-in rules for the international marketplaces.
    fn default() -> Self {
        let mut table = Self::empty();
        let builtin = [
            ("Amazon", dec!(15), (5, 10), "Amazon ships internationally"),
            ("eBay", dec!(20), (7, 14), "Most eBay sellers ship internationally"),
            ("AliExpress", dec!(0), (15, 30), "Free shipping on most items"),
            ("BangGood", dec!(5), (10, 20), "Ships worldwide"),
            ("Gearbest", dec!(8), (15, 25), "Ships worldwide"),
            ("Wish", dec!(10), (10, 25), "Ships to the destination"),
            ("Overstock", dec!(25), (10, 15), "Overstock ships internationally"),
        ];
        for (source, cost, (min, max), details) in builtin {
            table.insert(ShippingQuote::ships(
                source,
                cost,
                Some(DeliveryWindow::new(min, max)),
                details,
            ));
        }
        table.insert(ShippingQuote::no_shipping(
            "Newegg",
            "Newegg primarily ships within the US",
        ));
        table
    }
}

impl ShippingTable {
    /// A table with no rules; every source gets the default quote.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Add or replace the rule for `quote.source_id`.
    pub fn insert(&mut self, quote: ShippingQuote) {
        self.rules.insert(quote.source_id.to_lowercase(), quote);
    }

    /// Add the quotes adapters publish for themselves, replacing built-in
    /// rules for the same source.
    pub fn with_adapter_quotes(mut self, adapters: &[Arc<dyn SourceAdapter>]) -> Self {
        for adapter in adapters {
            if let Some(quote) = adapter.shipping_quote() {
                self.insert(ShippingQuote {
                    source_id: adapter.id().to_string(),
                    ..quote
                });
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The configured rule for a source, if any.
    pub fn rule(&self, source_id: &str) -> Option<&ShippingQuote> {
        self.rules.get(&source_id.to_lowercase())
    }

    /// The quote applied to `source_id`: its rule or the default.
    pub fn quote_for(&self, source_id: &str) -> ShippingQuote {
        self.rule(source_id)
            .cloned()
            .unwrap_or_else(|| Self::default_quote(source_id))
    }

    /// Quote for a source without a rule.
    pub fn default_quote(source_id: &str) -> ShippingQuote {
        ShippingQuote::ships(
            source_id,
            DEFAULT_SHIPPING_COST,
            Some(DEFAULT_DELIVERY_WINDOW),
            "International shipping assumed available",
        )
    }

    /// Join every listing with its quote.
    pub fn augment(&self, listings: Vec<ProductListing>) -> Vec<RankedListing> {
        listings
            .into_iter()
            .map(|listing| {
                let quote = self.quote_for(&listing.source_id);
                RankedListing::new(listing, quote)
            })
            .collect()
    }
}
