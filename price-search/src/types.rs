//! Core value types: queries, listings, shipping quotes and ranked output.
//!
//! Every type here is an immutable value once constructed. Pipeline stages
//! consume a value and produce a new one; nothing is shared mutably between
//! concurrent adapter tasks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SearchError};

/// Shortest accepted query, in characters, after trimming.
pub const MIN_QUERY_CHARS: usize = 2;

/// ISO 4217 currencies the catalogs report prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Israeli new shekel.
    #[serde(rename = "ILS")]
    Ils,
    /// US dollar.
    #[serde(rename = "USD")]
    Usd,
    /// Euro.
    #[serde(rename = "EUR")]
    Eur,
    /// Pound sterling.
    #[serde(rename = "GBP")]
    Gbp,
}

impl Currency {
    /// Returns the three-letter ISO code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ils => "ILS",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ILS" | "NIS" => Ok(Self::Ils),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            other => Err(SearchError::Config(format!(
                "unrecognised currency code: {other}"
            ))),
        }
    }
}

/// A user's search request.
///
/// Constructed through [`Query::new`], which rejects empty and too-short
/// input, so a `Query` value is always searchable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    locale: Option<String>,
    currency: Option<Currency>,
}

impl Query {
    /// Build a query from free text.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] if the trimmed text is empty or
    /// shorter than [`MIN_QUERY_CHARS`] characters.
    pub fn new(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SearchError::InvalidQuery("query must not be empty".into()));
        }
        if trimmed.chars().count() < MIN_QUERY_CHARS {
            return Err(SearchError::InvalidQuery(format!(
                "query must be at least {MIN_QUERY_CHARS} characters long"
            )));
        }
        Ok(Self {
            text: trimmed.to_string(),
            locale: None,
            currency: None,
        })
    }

    /// Attach a locale hint such as `he-IL`.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Attach a preferred currency.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// The trimmed query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn currency(&self) -> Option<Currency> {
        self.currency
    }

    /// Lower-cased, whitespace-delimited query tokens.
    pub fn tokens(&self) -> Vec<String> {
        self.text
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One product offer returned by a single source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    /// Product title as shown by the source.
    pub title: String,
    /// Offer price, never negative.
    pub price: Decimal,
    /// Currency the price is quoted in.
    pub currency: Currency,
    /// Identifier of the adapter that produced this listing.
    pub source_id: String,
    /// Canonical product URL.
    pub url: String,
    /// Product image, if the source shows one.
    pub image_url: Option<String>,
    /// Text the listing was matched against (title plus any extra text
    /// the source exposes).
    pub raw_match_text: String,
    /// `true` for placeholder listings synthesized when no real data exists.
    #[serde(default)]
    pub is_estimate: bool,
}

impl ProductListing {
    /// Create a real (non-estimate) listing whose match text is its title.
    pub fn new(
        title: impl Into<String>,
        price: Decimal,
        currency: Currency,
        source_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let title = title.into();
        Self {
            raw_match_text: title.clone(),
            title,
            price,
            currency,
            source_id: source_id.into(),
            url: url.into(),
            image_url: None,
            is_estimate: false,
        }
    }

    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_match_text(mut self, text: impl Into<String>) -> Self {
        self.raw_match_text = text.into();
        self
    }

    /// Mark this listing as a synthesized estimate.
    pub fn into_estimate(mut self) -> Self {
        self.is_estimate = true;
        self
    }

    /// Check the listing invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidListing`] for a negative price or an
    /// empty title, source or URL.
    pub fn validate(&self) -> Result<()> {
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(SearchError::InvalidListing(format!(
                "negative price {} for '{}'",
                self.price, self.title
            )));
        }
        if self.title.trim().is_empty() {
            return Err(SearchError::InvalidListing("empty title".into()));
        }
        if self.source_id.trim().is_empty() {
            return Err(SearchError::InvalidListing(format!(
                "missing source for '{}'",
                self.title
            )));
        }
        if self.url.trim().is_empty() {
            return Err(SearchError::InvalidListing(format!(
                "missing URL for '{}'",
                self.title
            )));
        }
        Ok(())
    }
}

/// Inclusive delivery time range in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryWindow {
    pub min_days: u16,
    pub max_days: u16,
}

impl DeliveryWindow {
    /// Build a window, swapping the bounds if given in reverse.
    pub fn new(min_days: u16, max_days: u16) -> Self {
        Self {
            min_days: min_days.min(max_days),
            max_days: min_days.max(max_days),
        }
    }
}

impl fmt::Display for DeliveryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} days", self.min_days, self.max_days)
    }
}

/// Shipping terms for one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingQuote {
    pub source_id: String,
    pub ships_to_destination: bool,
    /// Shipping cost in the listing's currency. Ignored when the source
    /// does not ship to the destination.
    pub cost: Decimal,
    pub estimated_days: Option<DeliveryWindow>,
    /// Short human-readable note about the terms.
    pub details: String,
}

impl ShippingQuote {
    /// A quote for a source that ships to the destination.
    pub fn ships(
        source_id: impl Into<String>,
        cost: Decimal,
        estimated_days: Option<DeliveryWindow>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            ships_to_destination: true,
            cost: cost.max(Decimal::ZERO),
            estimated_days,
            details: details.into(),
        }
    }

    /// A quote for a source that does not ship to the destination.
    pub fn no_shipping(source_id: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            ships_to_destination: false,
            cost: Decimal::ZERO,
            estimated_days: None,
            details: details.into(),
        }
    }

    /// The amount this quote adds to a listing's price.
    pub fn applied_cost(&self) -> Decimal {
        if self.ships_to_destination {
            self.cost
        } else {
            Decimal::ZERO
        }
    }
}

/// A listing joined with its shipping quote and landed cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedListing {
    #[serde(flatten)]
    pub listing: ProductListing,
    pub shipping: ShippingQuote,
    /// `price + shipping cost` when the source ships, otherwise `price`.
    pub total_cost: Decimal,
}

impl RankedListing {
    pub fn new(listing: ProductListing, shipping: ShippingQuote) -> Self {
        let total_cost = listing.price + shipping.applied_cost();
        Self {
            listing,
            shipping,
            total_cost,
        }
    }

    pub fn title(&self) -> &str {
        &self.listing.title
    }

    pub fn price(&self) -> Decimal {
        self.listing.price
    }

    pub fn currency(&self) -> Currency {
        self.listing.currency
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    pub fn shipping_eligible(&self) -> bool {
        self.shipping.ships_to_destination
    }

    pub fn estimated_days(&self) -> Option<DeliveryWindow> {
        self.shipping.estimated_days
    }

    pub fn source_id(&self) -> &str {
        &self.listing.source_id
    }

    pub fn url(&self) -> &str {
        &self.listing.url
    }

    pub fn is_estimate(&self) -> bool {
        self.listing.is_estimate
    }
}

/// Result of one fan-out branch after the retry policy has run.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterOutcome {
    /// The adapter answered; `attempts` counts the attempt that succeeded.
    Success {
        listings: Vec<ProductListing>,
        attempts: u32,
    },
    /// Every attempt failed, or the branch was interrupted.
    Failure { error: SearchError, attempts: u32 },
}

impl AdapterOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::Failure { attempts, .. } => *attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// How a single source fared during a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Succeeded { count: usize },
    Failed { reason: String },
}

/// Per-source summary included in every [`SearchResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source_id: String,
    #[serde(flatten)]
    pub status: SourceStatus,
    pub attempts: u32,
}

/// The caller-visible result of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Listings sorted by ascending landed cost.
    pub listings: Vec<RankedListing>,
    /// `true` iff no real listing survived filtering and the listings are
    /// synthesized estimates.
    pub used_fallback: bool,
    /// One entry per queried source.
    pub sources: Vec<SourceReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn listing(price: Decimal) -> ProductListing {
        ProductListing::new(
            "Samsung Galaxy S25 Ultra",
            price,
            Currency::Ils,
            "KSP",
            "https://ksp.co.il/item/1",
        )
    }

    #[test]
    fn query_trims_and_tokenises() {
        let query = Query::new("  Samsung  S25 Ultra ").expect("valid query");
        assert_eq!(query.text(), "Samsung  S25 Ultra");
        assert_eq!(query.tokens(), vec!["samsung", "s25", "ultra"]);
    }

    #[test]
    fn query_rejects_empty_and_short() {
        assert!(matches!(
            Query::new("   "),
            Err(SearchError::InvalidQuery(_))
        ));
        assert!(matches!(Query::new("x"), Err(SearchError::InvalidQuery(_))));
        assert!(Query::new("tv").is_ok());
    }

    #[test]
    fn query_hints() {
        let query = Query::new("iphone")
            .expect("valid query")
            .with_locale("he-IL")
            .with_currency(Currency::Ils);
        assert_eq!(query.locale(), Some("he-IL"));
        assert_eq!(query.currency(), Some(Currency::Ils));
    }

    #[test]
    fn currency_parses_codes_case_insensitively() {
        assert_eq!("usd".parse::<Currency>().ok(), Some(Currency::Usd));
        assert_eq!("NIS".parse::<Currency>().ok(), Some(Currency::Ils));
        assert!("XYZ".parse::<Currency>().is_err());
        assert_eq!(Currency::Eur.to_string(), "EUR");
    }

    #[test]
    fn currency_serialises_as_iso_code() {
        let json = serde_json::to_string(&Currency::Ils).expect("serialize");
        assert_eq!(json, "\"ILS\"");
    }

    #[test]
    fn listing_validation() {
        assert!(listing(dec!(100)).validate().is_ok());
        assert!(listing(Decimal::ZERO).validate().is_ok());
        assert!(listing(dec!(-1)).validate().is_err());

        let mut untitled = listing(dec!(5));
        untitled.title = " ".into();
        assert!(untitled.validate().is_err());
    }

    #[test]
    fn match_text_defaults_to_title() {
        let l = listing(dec!(1));
        assert_eq!(l.raw_match_text, l.title);
        assert!(!l.is_estimate);
        assert!(l.into_estimate().is_estimate);
    }

    #[test]
    fn total_cost_adds_shipping_only_when_eligible() {
        let ships = ShippingQuote::ships("KSP", dec!(15), None, "");
        let ranked = RankedListing::new(listing(dec!(100)), ships);
        assert_eq!(ranked.total_cost(), dec!(115));
        assert!(ranked.shipping_eligible());

        let mut blocked = ShippingQuote::no_shipping("KSP", "domestic only");
        blocked.cost = dec!(40);
        let ranked = RankedListing::new(listing(dec!(100)), blocked);
        assert_eq!(ranked.total_cost(), dec!(100));
        assert!(!ranked.shipping_eligible());
    }

    #[test]
    fn negative_shipping_cost_is_clamped() {
        let quote = ShippingQuote::ships("eBay", dec!(-3), None, "");
        assert_eq!(quote.cost, Decimal::ZERO);
    }

    #[test]
    fn delivery_window_orders_bounds() {
        let window = DeliveryWindow::new(10, 5);
        assert_eq!(window.min_days, 5);
        assert_eq!(window.max_days, 10);
        assert_eq!(window.to_string(), "5-10 days");
    }

    #[test]
    fn outcome_attempts() {
        let ok = AdapterOutcome::Success {
            listings: vec![],
            attempts: 1,
        };
        let failed = AdapterOutcome::Failure {
            error: SearchError::Http("down".into()),
            attempts: 3,
        };
        assert!(ok.is_success());
        assert_eq!(ok.attempts(), 1);
        assert!(!failed.is_success());
        assert_eq!(failed.attempts(), 3);
    }

    #[test]
    fn ranked_listing_serialises_flat() {
        let ranked = RankedListing::new(
            listing(dec!(100)),
            ShippingQuote::ships("KSP", dec!(15), Some(DeliveryWindow::new(7, 21)), ""),
        );
        let json = serde_json::to_value(&ranked).expect("serialize");
        assert_eq!(json["title"], "Samsung Galaxy S25 Ultra");
        assert_eq!(json["currency"], "ILS");
        assert_eq!(json["is_estimate"], false);
        assert_eq!(json["shipping"]["ships_to_destination"], true);
    }

    #[test]
    fn source_report_serialises_status_tag() {
        let report = SourceReport {
            source_id: "Zap".into(),
            status: SourceStatus::Failed {
                reason: "timed out".into(),
            },
            attempts: 2,
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "timed out");
        assert_eq!(json["attempts"], 2);
    }
}
