/// Checks if a URL is a product URL for the given pattern
///
/// Matching is plain, case-sensitive substring containment over the whole URL
/// string. The pattern is not anchored to path segments, so `/p` matches
/// `https://shop.test/pnew/` as readily as `https://shop.test/p/123`.
///
/// # Arguments
///
/// * `pattern` - The registered product pattern, if any
/// * `url` - The absolute URL to classify
///
/// # Returns
///
/// * `true` - The pattern occurs somewhere in the URL
/// * `false` - No pattern is loaded, or it does not occur
///
/// # Examples
///
/// ```
/// use product_crawler::url::is_product_url;
///
/// assert!(is_product_url(Some("/p/"), "https://shop.test/p/123"));
/// assert!(!is_product_url(Some("/p/"), "https://shop.test/about"));
/// assert!(!is_product_url(None, "https://shop.test/p/123"));
/// ```
pub fn is_product_url(pattern: Option<&str>, url: &str) -> bool {
    match pattern {
        Some(pattern) if !pattern.is_empty() => url.contains(pattern),
        _ => false,
    }
}
