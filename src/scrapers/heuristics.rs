//! Asset-identifier extraction heuristics.
//!
//! The eBird catalog has no stable API for "top photos this week", so we
//! fish Macaulay Library asset numbers out of whatever markup the catalog
//! serves. Markup changes upstream break individual heuristics, so each one
//! is a standalone pure function over page content. Pipelines concatenate
//! their outputs in a fixed order and pass the result to [`dedupe_capped`].
//!
//! Two families live here:
//! - DOM heuristics over a parsed [`Html`] document (static pipeline) or
//!   attribute values read from a live browser (browser pipeline)
//! - raw-markup regex heuristics over the page source

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

/// Asset numbers shorter than this are never real catalog entries.
pub const MIN_ASSET_LEN: usize = 8;

/// Only the first this-many `img` elements of a rendered page are inspected.
pub const DOM_IMAGE_LIMIT: usize = 20;

/// Only the first this-many `a` elements of a rendered page are inspected.
pub const DOM_LINK_LIMIT: usize = 50;

/// Known-good assets used whenever extraction yields nothing.
pub const FALLBACK_ASSETS: [&str; 8] = [
    "629849023",
    "629848993",
    "629848963",
    "629848933",
    "629848903",
    "629848873",
    "629848843",
    "629848813",
];

static ASSET_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"macaulaylibrary\.org/asset/([0-9]+)").unwrap());
static ASSET_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/asset/([0-9]+)").unwrap());
static ASSET_PATH_BOUNDED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/asset/([0-9]{8,12})").unwrap());
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]{8,12})").unwrap());
static WORD_DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([0-9]{8,12})\b").unwrap());
static ML_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"ML([0-9]{8,12})").unwrap());
static ASSET_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"macaulaylibrary\.org/asset/([0-9]{8,12})").unwrap());
static CATALOG_ID_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""catalogId"\s*:\s*"?([0-9]{8,12})"?"#).unwrap());
static ASSET_ID_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""assetId"\s*:\s*"?([0-9]{8,12})"?"#).unwrap());
static IMAGE_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/([0-9]{9,12})\.(jpg|jpeg|png|webp)").unwrap());
static DATA_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:data-asset-id|assetId|catalogId)["']?\s*[:=]\s*["']?([0-9]{8,12})"#)
        .unwrap()
});

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());
static DATA_ASSET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-asset-id]").unwrap());

/// Every first capture group of `re` in `haystack`, in document order.
fn captures(re: &Regex, haystack: &str) -> Vec<String> {
    re.captures_iter(haystack)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// The fallback list as owned strings.
pub fn fallback_assets() -> Vec<String> {
    FALLBACK_ASSETS.iter().map(|s| s.to_string()).collect()
}

/// Deduplicate candidates by first occurrence.
///
/// Candidates that are not all ASCII digits or are shorter than
/// [`MIN_ASSET_LEN`] characters are dropped, and accumulation
/// stops as soon as `cap` unique identifiers have been collected.
pub fn dedupe_capped<I>(candidates: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    candidates
        .into_iter()
        .filter(|a| a.len() >= MIN_ASSET_LEN && a.bytes().all(|b| b.is_ascii_digit()))
        .unique()
        .take(cap)
        .collect()
}

// --- DOM heuristics (parsed document) ---

/// Anchors linking to a Macaulay Library asset page.
pub fn anchor_asset_links(document: &Html) -> Vec<String> {
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| ASSET_LINK.is_match(href))
        .filter_map(|href| ASSET_PATH.captures(href))
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Word-bounded 8–12 digit runs inside `img` sources.
pub fn image_src_numbers(document: &Html) -> Vec<String> {
    document
        .select(&IMG_SELECTOR)
        .filter_map(|img| img.value().attr("src"))
        .flat_map(|src| captures(&WORD_DIGIT_RUN, src))
        .collect()
}

/// Explicit `data-asset-id` attributes with an all-digit value.
pub fn data_asset_ids(document: &Html) -> Vec<String> {
    document
        .select(&DATA_ASSET_SELECTOR)
        .filter_map(|el| el.value().attr("data-asset-id"))
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

/// `ML` catalog numbers in the document's visible text.
///
/// Text anywhere under a `script`, `style` or `template` element is not
/// visible and is skipped.
pub fn ml_text_numbers(document: &Html) -> Vec<String> {
    let text: String = document
        .root_element()
        .descendants()
        .filter(|node| {
            !node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| matches!(e.name(), "script" | "style" | "template"))
            })
        })
        .filter_map(|node| node.value().as_text().map(|t| &**t))
        .collect();
    captures(&ML_NUMBER, &text)
}

// --- DOM heuristics (attribute values read from a live browser) ---

/// Every 8–12 digit run in the first [`DOM_IMAGE_LIMIT`] image sources.
pub fn rendered_image_numbers(srcs: &[String]) -> Vec<String> {
    srcs.iter()
        .take(DOM_IMAGE_LIMIT)
        .flat_map(|src| captures(&DIGIT_RUN, src))
        .collect()
}

/// Asset numbers in the first [`DOM_LINK_LIMIT`] links that point at
/// Macaulay Library asset pages.
pub fn rendered_link_numbers(hrefs: &[String]) -> Vec<String> {
    hrefs
        .iter()
        .take(DOM_LINK_LIMIT)
        .filter(|href| href.contains("macaulaylibrary.org/asset"))
        .flat_map(|href| captures(&ASSET_PATH_BOUNDED, href))
        .collect()
}

// --- raw markup heuristics ---

pub fn markup_asset_urls(markup: &str) -> Vec<String> {
    captures(&ASSET_URL, markup)
}

pub fn markup_ml_numbers(markup: &str) -> Vec<String> {
    captures(&ML_NUMBER, markup)
}

/// `"catalogId": 123…` fields of embedded JSON.
pub fn markup_catalog_ids(markup: &str) -> Vec<String> {
    captures(&CATALOG_ID_FIELD, markup)
}

/// `"assetId": 123…` fields of embedded JSON.
pub fn markup_asset_ids(markup: &str) -> Vec<String> {
    captures(&ASSET_ID_FIELD, markup)
}

/// 9–12 digit image file names (`/123456789.jpg`).
pub fn markup_image_files(markup: &str) -> Vec<String> {
    captures(&IMAGE_FILE, markup)
}

/// Loose `data-asset-id=` / `assetId:` / `catalogId=` assignments.
pub fn markup_data_attributes(markup: &str) -> Vec<String> {
    captures(&DATA_ATTRIBUTE, markup)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence_order() {
        let input = s(&["111111111", "222222222", "111111111", "333333333"]);
        assert_eq!(
            dedupe_capped(input, 10),
            s(&["111111111", "222222222", "333333333"])
        );
    }

    #[test]
    fn test_dedupe_drops_short_and_caps() {
        let input = s(&["1234567", "12345678", "22345678", "32345678"]);
        assert_eq!(dedupe_capped(input, 2), s(&["12345678", "22345678"]));
    }

    #[test]
    fn test_dedupe_cap_counts_unique_only() {
        let input = s(&["12345678", "12345678", "12345678", "22345678"]);
        assert_eq!(dedupe_capped(input, 2), s(&["12345678", "22345678"]));
    }

    #[test]
    fn test_dedupe_requires_ascii_digits() {
        // five Arabic-Indic digits are ten bytes of UTF-8
        let input = s(&["\u{661}\u{662}\u{663}\u{664}\u{665}", "61234567x", "612345678"]);
        assert_eq!(dedupe_capped(input, 15), s(&["612345678"]));
    }

    #[test]
    fn test_fallback_has_eight_entries() {
        let fallback = fallback_assets();
        assert_eq!(fallback.len(), 8);
        assert_eq!(fallback[0], "629849023");
        assert_eq!(fallback[7], "629848813");
    }

    #[test]
    fn test_anchor_asset_links() {
        let html = Html::parse_document(
            r#"<a href="https://macaulaylibrary.org/asset/612345678">one</a>
               <a href="/asset/999999999">not ML</a>
               <a href="https://macaulaylibrary.org/asset/1234">short</a>"#,
        );
        // short ids survive extraction; dedupe filters them later
        assert_eq!(anchor_asset_links(&html), s(&["612345678", "1234"]));
    }

    #[test]
    fn test_anchor_asset_links_ignore_non_ascii_digits() {
        let html = Html::parse_document(
            r#"<a href="https://macaulaylibrary.org/asset/١٢٣٤٥">x</a>
               <a href="https://macaulaylibrary.org/asset/٦١٢٣٤٥٦٧٨">y</a>"#,
        );
        assert!(anchor_asset_links(&html).is_empty());
    }

    #[test]
    fn test_image_src_numbers_word_bounded() {
        let html = Html::parse_document(
            r#"<img src="https://cdn.download.ams.birds.cornell.edu/api/v1/asset/612345678/480">
               <img src="/thumbs/x1234567890123456.jpg">
               <img alt="none">"#,
        );
        assert_eq!(image_src_numbers(&html), s(&["612345678"]));
    }

    #[test]
    fn test_data_asset_ids_digits_only() {
        let html = Html::parse_document(
            r#"<div data-asset-id="612345678"></div>
               <div data-asset-id="abc123"></div>
               <span data-asset-id="712345678"></span>"#,
        );
        assert_eq!(data_asset_ids(&html), s(&["612345678", "712345678"]));
    }

    #[test]
    fn test_ml_text_numbers() {
        let html = Html::parse_document(
            "<p>Photo ML612345678 by someone</p><p>ML7123</p><p>ML712345678</p>",
        );
        assert_eq!(ml_text_numbers(&html), s(&["612345678", "712345678"]));
    }

    #[test]
    fn test_ml_text_numbers_skip_script_and_style() {
        let html = Html::parse_document(
            r#"<p>nothing</p><script>var x = "ML612345678";</script>
               <style>/* ML712345678 */</style>
               <template><p>ML812345678</p></template>
               <p>ML912345678</p>"#,
        );
        assert_eq!(ml_text_numbers(&html), s(&["912345678"]));
    }

    #[test]
    fn test_rendered_image_numbers_respects_limit() {
        let mut srcs: Vec<String> = (0..25).map(|i| format!("/img/{}.jpg", 100000000 + i)).collect();
        srcs.push("/img/999999999.jpg".to_string());
        let found = rendered_image_numbers(&srcs);
        assert_eq!(found.len(), DOM_IMAGE_LIMIT);
        assert!(!found.contains(&"999999999".to_string()));
    }

    #[test]
    fn test_rendered_image_numbers_greedy_runs() {
        // a 20 digit run yields a 12 digit match then an 8 digit one
        let srcs = s(&["/x/12345678901234567890"]);
        assert_eq!(rendered_image_numbers(&srcs), s(&["123456789012", "34567890"]));
    }

    #[test]
    fn test_rendered_link_numbers() {
        let hrefs = s(&[
            "https://macaulaylibrary.org/asset/612345678",
            "https://example.com/asset/712345678",
            "https://macaulaylibrary.org/asset/1234",
        ]);
        assert_eq!(rendered_link_numbers(&hrefs), s(&["612345678"]));
    }

    #[test]
    fn test_markup_json_fields() {
        let markup = r#"{"catalogId": "612345678", "assetId":712345678, "catalogId":"1"}"#;
        assert_eq!(markup_catalog_ids(markup), s(&["612345678"]));
        assert_eq!(markup_asset_ids(markup), s(&["712345678"]));
    }

    #[test]
    fn test_markup_image_files_case_insensitive() {
        let markup = r#"<img src="/a/612345678.JPG"><img src="/b/71234567.jpg"><img src="/c/812345678.webp">"#;
        // eight digits are too short for this pattern
        assert_eq!(markup_image_files(markup), s(&["612345678", "812345678"]));
    }

    #[test]
    fn test_markup_data_attributes() {
        let markup = r#"<div data-asset-id="612345678"></div> {assetid: 712345678} catalogId='812345678'"#;
        assert_eq!(
            markup_data_attributes(markup),
            s(&["612345678", "712345678", "812345678"])
        );
    }

    #[test]
    fn test_markup_asset_urls_and_ml_numbers() {
        let markup = "see https://macaulaylibrary.org/asset/612345678 and ML712345678";
        assert_eq!(markup_asset_urls(markup), s(&["612345678"]));
        assert_eq!(markup_ml_numbers(markup), s(&["712345678"]));
    }
}
