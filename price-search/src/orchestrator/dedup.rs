//! Collapse repeated offers from one source.
//!
//! Catalog pages often render the same product card twice (a featured slot
//! plus the regular grid). Listings from the same source whose canonical
//! URLs match are merged, keeping the cheapest. Listings from different
//! sources are never merged: each source's offer is ranked on its own.

use std::collections::HashMap;

use crate::types::ProductListing;

use super::url_normalize::canonical_url;

/// Remove same-source duplicates, keeping the first-seen position and the
/// lowest price of each group.
pub fn dedup_within_sources(listings: Vec<ProductListing>) -> Vec<ProductListing> {
    let mut positions: HashMap<(String, String), usize> = HashMap::new();
    let mut kept: Vec<ProductListing> = Vec::with_capacity(listings.len());

    for listing in listings {
        let key = (listing.source_id.clone(), canonical_url(&listing.url));
        match positions.get(&key) {
            Some(&index) => {
                if listing.price < kept[index].price {
                    kept[index] = listing;
                }
            }
            None => {
                positions.insert(key, kept.len());
                kept.push(listing);
            }
        }
    }

    kept
}
