//! Generic HTML catalog adapter driven by per-site selector descriptors.
//!
//! Most retail catalogs render their search results as a list of product
//! cards with a title, a price and a link. [`HtmlCatalogAdapter`] fetches a
//! catalog's search page and extracts those cards using the CSS selectors in
//! a [`CatalogSite`]. All site-specific markup knowledge lives in the
//! descriptor; see [`super::sites`] for the built-in ones.

use async_trait::async_trait;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;
use url::Url;

use crate::adapter::SourceAdapter;
use crate::context::SearchContext;
use crate::error::SearchError;
use crate::http;
use crate::types::{Currency, ProductListing, Query, ShippingQuote};

/// Markup description of one catalog's search results page.
#[derive(Debug, Clone, Copy)]
pub struct CatalogSite {
    /// Source identifier, also used as the shipping table key.
    pub id: &'static str,
    /// Search page URL without the query string.
    pub endpoint: &'static str,
    /// Query-string parameter carrying the search text.
    pub query_param: &'static str,
    /// Fixed query-string parameters sent with every search.
    pub extra_params: &'static [(&'static str, &'static str)],
    /// Selector matching one product card.
    pub item_selector: &'static str,
    pub title_selector: &'static str,
    pub price_selector: &'static str,
    /// Selector of the element whose `href` is the product link.
    pub link_selector: &'static str,
    pub image_selector: &'static str,
    pub currency: Currency,
    pub accept_language: &'static str,
    /// Number of cards inspected per page (counted before skipping).
    pub max_items: usize,
    /// Skip the first card (a promoted slot on some marketplaces).
    pub skip_first: bool,
    /// Cards whose title contains any of these are placeholders, not offers.
    pub skip_titles: &'static [&'static str],
}

/// A [`SourceAdapter`] that scrapes one [`CatalogSite`].
#[derive(Debug, Clone)]
pub struct HtmlCatalogAdapter {
    site: CatalogSite,
    endpoint: String,
    shipping: Option<ShippingQuote>,
}

impl HtmlCatalogAdapter {
    pub fn new(site: CatalogSite) -> Self {
        Self {
            site,
            endpoint: site.endpoint.to_string(),
            shipping: None,
        }
    }

    /// Point the adapter at a different search endpoint (a mirror or a
    /// local test server). Relative links resolve against this endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Publish shipping terms for this source.
    pub fn with_shipping(mut self, quote: ShippingQuote) -> Self {
        self.shipping = Some(quote);
        self
    }

    /// Build the search URL for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Parse`] if the endpoint is not a valid URL.
    pub fn search_url(&self, query: &Query) -> Result<Url, SearchError> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| {
            SearchError::Parse(format!("{} endpoint is not a valid URL: {e}", self.site.id))
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in self.site.extra_params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair(self.site.query_param, query.text());
        }
        Ok(url)
    }
}

#[async_trait]
impl SourceAdapter for HtmlCatalogAdapter {
    fn id(&self) -> &str {
        self.site.id
    }

    async fn fetch(
        &self,
        query: &Query,
        ctx: &SearchContext,
    ) -> Result<Vec<ProductListing>, SearchError> {
        let id = self.site.id;
        tracing::trace!(source = id, query = %query, "catalog search");

        let url = self.search_url(query)?;
        let accept_language = query.locale().unwrap_or(self.site.accept_language);
        let client =
            http::build_client(id, ctx.user_agent(), accept_language, ctx.attempt_timeout())?;

        ctx.guard(id, async {
            let response = client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| SearchError::Http(format!("{id} request failed: {e}")))?
                .error_for_status()
                .map_err(|e| SearchError::Http(format!("{id} HTTP error: {e}")))?;

            let html = response
                .text()
                .await
                .map_err(|e| SearchError::Http(format!("{id} response read failed: {e}")))?;

            tracing::trace!(source = id, bytes = html.len(), "catalog response received");

            parse_catalog_html(&self.site, &url, &html)
        })
        .await
    }

    fn shipping_quote(&self) -> Option<ShippingQuote> {
        self.shipping.clone()
    }
}

/// Parse a catalog search page into listings.
///
/// Cards missing a title, price or link are skipped, as are cards whose
/// price does not parse to a positive amount. Relative links and images are
/// resolved against `base`.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] only if a selector in `site` is invalid.
pub fn parse_catalog_html(
    site: &CatalogSite,
    base: &Url,
    html: &str,
) -> Result<Vec<ProductListing>, SearchError> {
    let document = Html::parse_document(html);

    let item_sel = selector(site.id, "item", site.item_selector)?;
    let title_sel = selector(site.id, "title", site.title_selector)?;
    let price_sel = selector(site.id, "price", site.price_selector)?;
    let link_sel = selector(site.id, "link", site.link_selector)?;
    let image_sel = selector(site.id, "image", site.image_selector)?;

    let mut listings = Vec::new();

    for (index, card) in document.select(&item_sel).enumerate() {
        if index >= site.max_items {
            break;
        }
        if site.skip_first && index == 0 {
            continue;
        }

        let Some(title) = first_text(&card, &title_sel) else {
            continue;
        };
        if site.skip_titles.iter().any(|skip| title.contains(skip)) {
            continue;
        }
        let Some(price) = first_text(&card, &price_sel).and_then(|t| parse_price(&t)) else {
            continue;
        };
        let Some(link) = card
            .select(&link_sel)
            .find_map(|el| el.value().attr("href"))
            .and_then(|href| resolve(base, href))
        else {
            continue;
        };

        let mut listing = ProductListing::new(title, price, site.currency, site.id, link);
        if let Some(image) = card
            .select(&image_sel)
            .find_map(|el| el.value().attr("src").or_else(|| el.value().attr("data-src")))
            .and_then(|src| resolve(base, src))
        {
            listing = listing.with_image(image);
        }
        listings.push(listing);
    }

    Ok(listings)
}

/// Extract a price from display text such as `₪ 4,199.90`.
///
/// Every character other than ASCII digits and `.` is dropped before
/// parsing. Returns `None` unless the result is a positive amount.
pub fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let price = Decimal::from_str(&cleaned).ok()?;
    (price > Decimal::ZERO).then_some(price)
}

fn selector(site: &str, what: &str, css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css)
        .map_err(|e| SearchError::Parse(format!("invalid {site} {what} selector: {e:?}")))
}

/// Whitespace-collapsed text of the first non-empty match.
fn first_text(card: &ElementRef<'_>, sel: &Selector) -> Option<String> {
    card.select(sel)
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|t| !t.is_empty())
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchOptions;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{headers, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SHOP: CatalogSite = CatalogSite {
        id: "Shop",
        endpoint: "https://shop.example/search",
        query_param: "q",
        extra_params: &[("lang", "he")],
        item_selector: ".product-item, .product",
        title_selector: ".product-title, .name",
        price_selector: ".price",
        link_selector: "a",
        image_selector: "img",
        currency: Currency::Ils,
        accept_language: "he-IL,he;q=0.9,en;q=0.8",
        max_items: 10,
        skip_first: false,
        skip_titles: &[],
    };

    const PAGE: &str = r#"
        <html><body>
          <div class="product-item">
            <a href="/p/s25-ultra"><span class="product-title">Samsung Galaxy
              S25 Ultra 256GB</span></a>
            <span class="price">₪ 4,899.90</span>
            <img src="/img/s25.jpg">
          </div>
          <div class="product">
            <a href="https://cdn.shop.example/p/2"><span class="name">Galaxy S25</span></a>
            <span class="price">3,599</span>
            <img data-src="//cdn.shop.example/s25.png">
          </div>
          <div class="product-item">
            <a href="/p/no-price"><span class="product-title">No price</span></a>
          </div>
          <div class="product-item">
            <span class="product-title">No link</span><span class="price">10</span>
          </div>
          <div class="product-item">
            <a href="/p/free"><span class="product-title">Free gift</span></a>
            <span class="price">0</span>
          </div>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse(SHOP.endpoint).expect("valid base")
    }

    #[test]
    fn parses_cards_and_resolves_links() {
        let listings = parse_catalog_html(&SHOP, &base(), PAGE).expect("parse");
        assert_eq!(listings.len(), 2);

        let first = &listings[0];
        assert_eq!(first.title, "Samsung Galaxy S25 Ultra 256GB");
        assert_eq!(first.price, dec!(4899.90));
        assert_eq!(first.currency, Currency::Ils);
        assert_eq!(first.source_id, "Shop");
        assert_eq!(first.url, "https://shop.example/p/s25-ultra");
        assert_eq!(
            first.image_url.as_deref(),
            Some("https://shop.example/img/s25.jpg")
        );

        let second = &listings[1];
        assert_eq!(second.url, "https://cdn.shop.example/p/2");
        assert_eq!(
            second.image_url.as_deref(),
            Some("https://cdn.shop.example/s25.png")
        );
    }

    #[test]
    fn respects_item_cap_and_skip_first() {
        let site = CatalogSite {
            max_items: 2,
            skip_first: true,
            ..SHOP
        };
        let listings = parse_catalog_html(&site, &base(), PAGE).expect("parse");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "Galaxy S25");
    }

    #[test]
    fn skips_placeholder_titles() {
        let site = CatalogSite {
            skip_titles: &["Galaxy S25"],
            ..SHOP
        };
        let listings = parse_catalog_html(&site, &base(), PAGE).expect("parse");
        assert!(listings.is_empty());
    }

    #[test]
    fn invalid_selector_is_a_parse_error() {
        let site = CatalogSite {
            item_selector: "<<<",
            ..SHOP
        };
        let err = parse_catalog_html(&site, &base(), PAGE).unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
        assert!(err.to_string().contains("item selector"));
    }

    #[test]
    fn empty_page_yields_no_listings() {
        let listings = parse_catalog_html(&SHOP, &base(), "<html></html>").expect("parse");
        assert!(listings.is_empty());
    }

    #[test]
    fn price_parsing() {
        assert_eq!(parse_price("₪ 4,199"), Some(dec!(4199)));
        assert_eq!(parse_price("$1,299.99"), Some(dec!(1299.99)));
        assert_eq!(parse_price("0.00"), None);
        assert_eq!(parse_price("call for price"), None);
        assert_eq!(parse_price("1.299.00"), None);
    }

    #[test]
    fn search_url_encodes_query_and_extra_params() {
        let adapter = HtmlCatalogAdapter::new(SHOP);
        let query = Query::new("galaxy s25 ultra").expect("valid query");
        let url = adapter.search_url(&query).expect("url");
        assert_eq!(
            url.as_str(),
            "https://shop.example/search?lang=he&q=galaxy+s25+ultra"
        );
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let adapter = HtmlCatalogAdapter::new(SHOP).with_endpoint("not a url");
        let query = Query::new("galaxy").expect("valid query");
        assert!(adapter.search_url(&query).is_err());
    }

    #[tokio::test]
    async fn fetches_and_parses_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "galaxy s25"))
            .and(headers(
                "accept-language",
                vec!["he-IL", "he;q=0.9", "en;q=0.8"],
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let adapter =
            HtmlCatalogAdapter::new(SHOP).with_endpoint(format!("{}/search", server.uri()));
        let query = Query::new("galaxy s25").expect("valid query");
        let ctx = SearchContext::new(&SearchOptions::default());

        let listings = adapter.fetch(&query, &ctx).await.expect("fetch");
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].url, format!("{}/p/s25-ultra", server.uri()));
    }

    #[tokio::test]
    async fn server_error_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let adapter =
            HtmlCatalogAdapter::new(SHOP).with_endpoint(format!("{}/search", server.uri()));
        let query = Query::new("galaxy").expect("valid query");
        let ctx = SearchContext::new(&SearchOptions::default());

        let err = adapter.fetch(&query, &ctx).await.unwrap_err();
        assert!(matches!(err, SearchError::Http(_)));
    }

    #[tokio::test]
    async fn cancelled_context_returns_promptly() {
        let adapter = HtmlCatalogAdapter::new(SHOP).with_endpoint("http://127.0.0.1:9/search");
        let query = Query::new("galaxy").expect("valid query");
        let ctx = SearchContext::new(&SearchOptions::default());
        ctx.cancel();

        let err = adapter.fetch(&query, &ctx).await.unwrap_err();
        assert!(matches!(err, SearchError::Cancelled(_)));
    }

    #[test]
    fn shipping_quote_is_optional() {
        let adapter = HtmlCatalogAdapter::new(SHOP);
        assert!(adapter.shipping_quote().is_none());
        let adapter = adapter.with_shipping(ShippingQuote::ships("Shop", dec!(0), None, "local"));
        assert_eq!(adapter.shipping_quote().map(|q| q.cost), Some(Decimal::ZERO));
    }
}
