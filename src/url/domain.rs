use url::Url;

/// Extracts the host of a URL, including an explicit non-default port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sitemap::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_host(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}

/// Returns true if `link` points at exactly the same host as `page`
///
/// Hosts compare together with their port, so `a.com:8080` and `a.com` are
/// different hosts. URLs without a host (`mailto:`) never match.
pub fn same_host(link: &Url, page: &Url) -> bool {
    match (extract_host(link), extract_host(page)) {
        (Some(link_host), Some(page_host)) => link_host == page_host,
        _ => false,
    }
}
