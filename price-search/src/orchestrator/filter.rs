//! Relevance filter: drop accessories and listings that do not match the query.
//!
//! Accessory words are looked for in the title only. Query tokens may hit
//! either the title or the extra match text a source supplies.
//!
//! Matching is deliberately lightweight. A query token "hits" a title when
//! it appears verbatim, when one of its known transliterations appears, or
//! (for tokens longer than four characters) when a partial stem appears.
//! A listing is kept when at least half of the query tokens hit, with a
//! floor of one. The synonym table and the 50% threshold are tuned
//! heuristics, not a correctness contract.
//!
//! ```text
//! required_hits = max(1, ceil(token_count * 0.5))
//! ```

use crate::types::{ProductListing, Query};

/// Words marking accessories rather than the product itself.
const ACCESSORY_WORDS: &[&str] = &[
    "case",
    "cover",
    "protector",
    "charger",
    "cable",
    "adapter",
    "stand",
    "holder",
    "mount",
    "כיסוי",
    "מגן",
    "מטען",
    "מעמד",
];

/// Cross-script equivalents for common brand and model words.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("samsung", &["סמסונג"]),
    ("galaxy", &["גלקסי"]),
    ("ultra", &["אולטרא"]),
    ("iphone", &["אייפון"]),
    ("pro", &["פרו"]),
    ("macbook", &["מקבוק"]),
    ("airpods", &["איירפודס"]),
    ("sony", &["סוני"]),
];

/// Tokens longer than this many characters may match by partial stem.
const STEM_MIN_CHARS: usize = 4;

/// Keep only listings that match `query` and are not accessories.
pub fn filter_listings(query: &Query, listings: Vec<ProductListing>) -> Vec<ProductListing> {
    let tokens = query.tokens();
    let before = listings.len();
    let kept: Vec<ProductListing> = listings
        .into_iter()
        .filter(|listing| listing_matches(&tokens, listing))
        .collect();
    tracing::debug!(before, after = kept.len(), "filtered listings");
    kept
}

/// Whether `listing` is kept: its title names no accessory, and enough
/// query tokens hit the title or the source's match text.
pub fn listing_matches(tokens: &[String], listing: &ProductListing) -> bool {
    let mut text = listing.title.to_lowercase();
    if is_accessory(&text) {
        return false;
    }
    if listing.raw_match_text != listing.title {
        text.push(' ');
        text.push_str(&listing.raw_match_text.to_lowercase());
    }
    hit_count(tokens, &text) >= required_hits(tokens.len())
}

/// Whether a bare title passes both the accessory and the match checks.
pub fn is_relevant(tokens: &[String], title: &str) -> bool {
    let title = title.to_lowercase();
    !is_accessory(&title) && hit_count(tokens, &title) >= required_hits(tokens.len())
}

/// Whether a lower-cased title names an accessory.
pub fn is_accessory(title: &str) -> bool {
    ACCESSORY_WORDS.iter().any(|word| title.contains(word))
}

/// Minimum number of token hits for a query of `token_count` tokens.
pub fn required_hits(token_count: usize) -> usize {
    token_count.div_ceil(2).max(1)
}

/// Number of query tokens that hit a lower-cased title.
pub fn hit_count(tokens: &[String], title: &str) -> usize {
    tokens.iter().filter(|token| token_hits(token, title)).count()
}

fn token_hits(token: &str, title: &str) -> bool {
    if title.contains(token) {
        return true;
    }
    if synonyms(token).iter().any(|alt| title.contains(alt)) {
        return true;
    }
    if token.chars().count() > STEM_MIN_CHARS {
        let head: String = token.chars().take(STEM_MIN_CHARS).collect();
        let tail: String = token.chars().skip(1).collect();
        return title.contains(&head) || title.contains(&tail);
    }
    false
}

fn synonyms(token: &str) -> &'static [&'static str] {
    SYNONYMS
        .iter()
        .find(|(word, _)| *word == token)
        .map(|(_, alts)| *alts)
        .unwrap_or(&[])
}
