//! Built-in catalog descriptors.
//!
//! Regional electronics and department stores (prices in ILS) plus two
//! international marketplaces (prices in USD). Selectors list the
//! alternatives each site has used for its product cards.

use super::html::CatalogSite;
use crate::types::Currency;

const HEBREW: &str = "he-IL,he;q=0.9,en;q=0.8";
const ENGLISH: &str = "en-US,en;q=0.5";

/// KSP: electronics chain with a Material UI grid of results.
pub const KSP: CatalogSite = CatalogSite {
    id: "KSP",
    endpoint: "https://ksp.co.il/web/cat/573..2567..0",
    query_param: "text",
    extra_params: &[],
    item_selector: ".MuiGrid-item",
    title_selector: r#"a[data-test="item-name"]"#,
    price_selector: r#"[data-test="item-price"]"#,
    link_selector: r#"a[data-test="item-name"]"#,
    image_selector: "img",
    currency: Currency::Ils,
    accept_language: HEBREW,
    max_items: 10,
    skip_first: false,
    skip_titles: &[],
};

pub const IVORY: CatalogSite = CatalogSite {
    id: "Ivory",
    endpoint: "https://www.ivory.co.il/catalog.php",
    query_param: "search",
    extra_params: &[("act", "cat")],
    item_selector: ".product-item, .product",
    title_selector: ".product-title, .product-name",
    price_selector: ".price, .product-price",
    link_selector: "a",
    image_selector: "img",
    currency: Currency::Ils,
    accept_language: HEBREW,
    max_items: 10,
    skip_first: false,
    skip_titles: &[],
};

pub const BUG: CatalogSite = CatalogSite {
    id: "Bug",
    endpoint: "https://www.bug.co.il/search",
    query_param: "q",
    extra_params: &[],
    item_selector: ".product-box, .product-item",
    title_selector: ".product-title, .name",
    price_selector: ".price, .product-price",
    link_selector: "a",
    image_selector: "img",
    currency: Currency::Ils,
    accept_language: HEBREW,
    max_items: 10,
    skip_first: false,
    skip_titles: &[],
};

/// Zap: price comparison portal.
pub const ZAP: CatalogSite = CatalogSite {
    id: "Zap",
    endpoint: "https://www.zap.co.il/search.aspx",
    query_param: "keyword",
    extra_params: &[],
    item_selector: ".ZapImage, .product",
    title_selector: ".Title, .product-name",
    price_selector: ".Price, .price",
    link_selector: "a",
    image_selector: "img",
    currency: Currency::Ils,
    accept_language: HEBREW,
    max_items: 10,
    skip_first: false,
    skip_titles: &[],
};

pub const PILPEL: CatalogSite = CatalogSite {
    id: "Pilpel",
    endpoint: "https://www.pilpel.co.il/search",
    query_param: "q",
    extra_params: &[],
    item_selector: ".product-item, .item",
    title_selector: ".product-title, .title",
    price_selector: ".price",
    link_selector: "a",
    image_selector: "img",
    currency: Currency::Ils,
    accept_language: HEBREW,
    max_items: 10,
    skip_first: false,
    skip_titles: &[],
};

pub const WINWIN: CatalogSite = CatalogSite {
    id: "WinWin",
    endpoint: "https://www.winwin.co.il/search",
    query_param: "q",
    extra_params: &[],
    item_selector: ".product, .item",
    title_selector: ".title, .product-name",
    price_selector: ".price",
    link_selector: "a",
    image_selector: "img",
    currency: Currency::Ils,
    accept_language: HEBREW,
    max_items: 10,
    skip_first: false,
    skip_titles: &[],
};

pub const HAMASHBIR: CatalogSite = CatalogSite {
    id: "Hamashbir",
    endpoint: "https://www.hamashbir.co.il/search",
    query_param: "q",
    extra_params: &[],
    item_selector: ".product-item, .product",
    title_selector: ".title, .name",
    price_selector: ".price",
    link_selector: "a",
    image_selector: "img",
    currency: Currency::Ils,
    accept_language: HEBREW,
    max_items: 10,
    skip_first: false,
    skip_titles: &[],
};

/// eBay: buy-it-now listings sorted by lowest price. The first card is a
/// promoted slot and "Shop on eBay" cards are placeholders.
pub const EBAY: CatalogSite = CatalogSite {
    id: "eBay",
    endpoint: "https://www.ebay.com/sch/i.html",
    query_param: "_nkw",
    extra_params: &[("_sacat", "0"), ("LH_BIN", "1"), ("_sop", "15")],
    item_selector: ".s-item",
    title_selector: ".s-item__title",
    price_selector: ".s-item__price",
    link_selector: ".s-item__link",
    image_selector: ".s-item__image img",
    currency: Currency::Usd,
    accept_language: ENGLISH,
    max_items: 15,
    skip_first: true,
    skip_titles: &["Shop on eBay"],
};

pub const OVERSTOCK: CatalogSite = CatalogSite {
    id: "Overstock",
    endpoint: "https://www.overstock.com/search",
    query_param: "keywords",
    extra_params: &[],
    item_selector: r#"[data-automation-id="product-result"]"#,
    title_selector: r#"a[data-automation-id="product-title"]"#,
    price_selector: r#"[data-automation-id="product-price"]"#,
    link_selector: r#"a[data-automation-id="product-title"]"#,
    image_selector: "img",
    currency: Currency::Usd,
    accept_language: ENGLISH,
    max_items: 10,
    skip_first: false,
    skip_titles: &[],
};

/// Every built-in catalog, in registration order.
pub const ALL: &[CatalogSite] = &[
    KSP, IVORY, BUG, ZAP, PILPEL, WINWIN, HAMASHBIR, EBAY, OVERSTOCK,
];

/// Look up a built-in catalog by id, ignoring ASCII case.
pub fn find(id: &str) -> Option<&'static CatalogSite> {
    ALL.iter().find(|site| site.id.eq_ignore_ascii_case(id))
}
