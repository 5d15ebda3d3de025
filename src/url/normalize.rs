use url::Url;

/// Returns true if the URL string starts with an HTTP(S) scheme
pub fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Resolves an href found on a page into an absolute URL without fragment
///
/// The href is joined against the URL of the page it was found on and any
/// `#fragment` is removed, so in-page anchors collapse onto the page itself.
/// Schemes are not filtered here; callers apply [`is_http`].
///
/// # Arguments
///
/// * `base_url` - URL of the page the href was found on
/// * `href` - The raw `href` attribute value
///
/// # Returns
///
/// * `Some(String)` - The absolute URL
/// * `None` - Empty href or resolution failure
///
/// # Examples
///
/// ```
/// use product_crawler::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://shop.test/category/shoes").unwrap();
/// assert_eq!(
///     resolve_link(&base, "../p/42#reviews"),
///     Some("https://shop.test/p/42".to_string())
/// );
/// ```
pub fn resolve_link(base_url: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    absolute.set_fragment(None);
    Some(absolute.to_string())
}
