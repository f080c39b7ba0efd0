//! Placeholder listings for searches where nothing relevant was found.
//!
//! Two estimated tiers are produced, linking to the search pages of two
//! local retailers so the user still has somewhere to look. Every listing
//! is marked [`ProductListing::is_estimate`] and must never be presented as
//! a real offer.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::adapters::sites::{IVORY, KSP};
use crate::adapters::{CatalogSite, HtmlCatalogAdapter};
use crate::types::{Currency, ProductListing, Query};

/// Lowest synthesized base price.
pub const BASE_PRICE_MIN: u32 = 1_000;
/// Upper bound (exclusive) of the synthesized base price.
pub const BASE_PRICE_MAX: u32 = 4_000;
/// Markup of the premium tier over the base price.
pub const PREMIUM_MARKUP: Decimal = dec!(500);

/// Synthesize estimates, seeded when `seed` is set.
pub fn synthesize_with_seed(query: &Query, seed: Option<u64>) -> Vec<ProductListing> {
    match seed {
        Some(seed) => synthesize(query, &mut StdRng::seed_from_u64(seed)),
        None => synthesize(query, &mut rand::thread_rng()),
    }
}

/// Produce a premium and a standard estimate for `query`.
///
/// The base price is drawn uniformly from
/// [`BASE_PRICE_MIN`]..[`BASE_PRICE_MAX`]; the premium tier adds
/// [`PREMIUM_MARKUP`]. Prices are in the query's currency hint, or ILS.
pub fn synthesize<R: Rng>(query: &Query, rng: &mut R) -> Vec<ProductListing> {
    let base = Decimal::from(rng.gen_range(BASE_PRICE_MIN..BASE_PRICE_MAX));
    let currency = query.currency().unwrap_or(Currency::Ils);

    let listings = vec![
        estimate(
            format!("{} - premium edition", query.text()),
            base + PREMIUM_MARKUP,
            currency,
            KSP,
            query,
        ),
        estimate(
            format!("{} - standard edition", query.text()),
            base,
            currency,
            IVORY,
            query,
        ),
    ];
    tracing::info!(%base, %currency, "no relevant listings; synthesized estimates");
    listings
}

fn estimate(
    title: String,
    price: Decimal,
    currency: Currency,
    site: CatalogSite,
    query: &Query,
) -> ProductListing {
    let url = HtmlCatalogAdapter::new(site)
        .search_url(query)
        .map(String::from)
        .unwrap_or_else(|_| site.endpoint.to_string());
    ProductListing::new(title, price, currency, site.id, url).into_estimate()
}
