//! Catalog adapter implementations.
//!
//! [`html::HtmlCatalogAdapter`] implements [`crate::adapter::SourceAdapter`]
//! for any catalog described by a [`html::CatalogSite`]; [`sites`] holds the
//! built-in descriptors.

pub mod html;
pub mod sites;

use std::sync::Arc;

use crate::adapter::SourceAdapter;
use crate::error::SearchError;

pub use html::{CatalogSite, HtmlCatalogAdapter};

/// One adapter per built-in catalog.
pub fn default_adapters() -> Vec<Arc<dyn SourceAdapter>> {
    sites::ALL
        .iter()
        .map(|site| Arc::new(HtmlCatalogAdapter::new(*site)) as Arc<dyn SourceAdapter>)
        .collect()
}

/// Adapters for the named built-in catalogs. An empty list selects all.
///
/// # Errors
///
/// Returns [`SearchError::Config`] naming the first unknown source.
pub fn adapters_for(ids: &[String]) -> Result<Vec<Arc<dyn SourceAdapter>>, SearchError> {
    if ids.is_empty() {
        return Ok(default_adapters());
    }
    ids.iter()
        .map(|id| {
            sites::find(id)
                .map(|site| Arc::new(HtmlCatalogAdapter::new(*site)) as Arc<dyn SourceAdapter>)
                .ok_or_else(|| SearchError::Config(format!("unknown source: {id}")))
        })
        .collect()
}
