//! HTML parser for extracting anchor hrefs
//!
//! The browser renderer serialises the live DOM after scripts have run and
//! hands it to [`extract_hrefs`]. Values are returned raw; resolution and
//! filtering happen in the page processor.

use scraper::{Html, Selector};

/// Extracts the `href` attribute of every `<a href>` in the document
///
/// Empty values are dropped. Order follows document order and duplicates are
/// kept.
///
/// # Example
///
/// ```
/// use product_crawler::crawler::extract_hrefs;
///
/// let html = r#"<html><body><a href="/p/1">One</a><a href="other">Two</a></body></html>"#;
/// assert_eq!(extract_hrefs(html), vec!["/p/1", "other"]);
/// ```
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
        .map(str::to_string)
        .collect()
}
