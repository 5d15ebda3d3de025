use url::Url;

/// Extracts the registered-domain key from a URL
///
/// The key is the URL authority without credentials: the lowercase host,
/// followed by `:port` when the URL carries a non-default port. This is the
/// string `patterns.json` is keyed by.
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// * `Some(String)` - The host, plus port if one is explicit
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use product_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://localhost:8080/").unwrap();
/// assert_eq!(extract_domain(&url), Some("localhost:8080".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Checks whether `url` belongs to `domain`
///
/// Accepts an exact authority match or a `www.` prefix on either side, so
/// `example.com` and `www.example.com` are treated as the same site. Other
/// subdomains are foreign. Unparsable URLs are never same-domain.
pub fn is_same_domain(url: &str, domain: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(candidate) = extract_domain(&parsed) else {
        return false;
    };

    candidate == domain
        || candidate.strip_prefix("www.") == Some(domain)
        || domain.strip_prefix("www.") == Some(candidate.as_str())
}
