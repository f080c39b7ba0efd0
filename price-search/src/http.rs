//! HTTP client setup for catalog requests.
//!
//! Retail sites serve their regular search pages only to clients that look
//! like a browser in the shopper's locale. Every catalog request therefore
//! carries an HTML `Accept` header, the catalog's `Accept-Language` and a
//! browser User-Agent. The User-Agent is fixed per catalog so that retries
//! against one site present the same browser.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use crate::error::SearchError;

/// Desktop and mobile browser User-Agents seen on retail storefronts.
const BROWSER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36 Edg/134.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 14; SM-S928B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:136.0) Gecko/20100101 Firefox/136.0",
];

/// `Accept` header of a browser navigating to a search results page.
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Build a [`reqwest::Client`] for one catalog.
///
/// The client sends `user_agent` if given, otherwise the browser assigned
/// to `source_id` by [`user_agent_for`]. It also keeps cookies (consent
/// banners), follows up to ten redirects and decompresses brotli and gzip.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if `accept_language` is not a valid header
/// value or the client cannot be constructed.
pub fn build_client(
    source_id: &str,
    user_agent: Option<&str>,
    accept_language: &str,
    timeout: Duration,
) -> Result<reqwest::Client, SearchError> {
    let ua = user_agent.unwrap_or_else(|| user_agent_for(source_id));

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(timeout)
        .user_agent(ua)
        .default_headers(catalog_headers(accept_language)?)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("{source_id}: failed to build HTTP client: {e}")))
}

/// Headers sent with every request to a catalog.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if `accept_language` contains characters
/// not allowed in a header.
pub fn catalog_headers(accept_language: &str) -> Result<HeaderMap, SearchError> {
    let language = HeaderValue::from_str(accept_language)
        .map_err(|e| SearchError::Http(format!("invalid Accept-Language {accept_language:?}: {e}")))?;
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, language);
    Ok(headers)
}

/// The browser User-Agent assigned to a catalog. Stable for a given id.
pub fn user_agent_for(source_id: &str) -> &'static str {
    // FNV-1a over the lower-cased id; ids are case-insensitive elsewhere.
    let hash = source_id
        .bytes()
        .map(|b| b.to_ascii_lowercase())
        .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        });
    let index = usize::try_from(hash % BROWSER_AGENTS.len() as u64).unwrap_or(0);
    BROWSER_AGENTS.get(index).copied().unwrap_or(BROWSER_AGENTS[0])
}
