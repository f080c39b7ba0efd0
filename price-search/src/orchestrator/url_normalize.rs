//! Canonical product URLs for duplicate detection.
//!
//! Catalogs decorate product links with tracking and session parameters,
//! so the same offer can appear under several URLs on one results page.
//! [`canonical_url`] strips that decoration.

use url::Url;

/// Query parameters that never identify a product.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "_trkparms",
    "_trksid",
    "itmmeta",
    "hash",
    "sessionid",
];

/// Canonicalise a product URL.
///
/// - scheme and host lower-cased (by [`Url::parse`]), path kept as-is
/// - default port and fragment removed
/// - tracking parameters removed, remaining parameters sorted
/// - trailing slash removed unless the path is `/`
///
/// Input that does not parse as an absolute URL is returned trimmed.
///
/// ```
/// use price_search::orchestrator::url_normalize::canonical_url;
///
/// assert_eq!(
///     canonical_url("https://KSP.co.il/item/42/?utm_source=x#reviews"),
///     canonical_url("https://ksp.co.il/item/42"),
/// );
/// ```
pub fn canonical_url(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    // Url::parse already drops the scheme's default port.
    url.set_fragment(None);

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();
    if params.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(params);
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    url.to_string()
}

fn is_tracking(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || key.starts_with("pf_rd_") || TRACKING_PARAMS.contains(&key.as_str())
}
