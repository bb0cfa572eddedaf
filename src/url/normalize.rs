use crate::url::CanonicalUrl;
use crate::UrlError;
use url::{ParseError, Position, Url};

/// Canonicalizes an absolute URL into its crawl identity
///
/// # Canonicalization Steps
///
/// 1. Remove the fragment (everything after #)
/// 2. Strip one trailing slash from the path
///
/// The url crate always serializes an empty path on `http`/`https` URLs as
/// `/`, so the canonical string is built by hand and drops that lone slash.
/// `https://x.com/`, `https://x.com` and `https://x.com/#top` therefore all
/// share the key `https://x.com`.
///
/// # Examples
///
/// ```
/// use sumi_sitemap::url::canonicalize;
/// use url::Url;
///
/// let url = canonicalize(Url::parse("https://example.com/a/#frag").unwrap());
/// assert_eq!(url.as_str(), "https://example.com/a");
/// ```
pub fn canonicalize(mut url: Url) -> CanonicalUrl {
    url.set_fragment(None);

    if let Some(trimmed) = url.path().strip_suffix('/') {
        let trimmed = trimmed.to_string();
        url.set_path(&trimmed);
    }

    let key = canonical_key(&url);
    CanonicalUrl::from_parts(url, key)
}

/// Builds the dedup key, dropping the root path that `Url` insists on keeping
fn canonical_key(url: &Url) -> String {
    let path = match url.path() {
        "/" => "",
        path => path,
    };

    format!(
        "{}{}{}",
        &url[..Position::BeforePath],
        path,
        &url[Position::AfterPath..]
    )
}

/// Parses the root URL the crawl starts from
///
/// A root without a scheme (`example.com/docs`, `localhost:8080`) defaults
/// to `http`. Only `http` and `https` roots are accepted, and the root must
/// carry a host.
///
/// # Arguments
///
/// * `raw` - The root URL as given by the user
///
/// # Returns
///
/// * `Ok(CanonicalUrl)` - The canonical root URL
/// * `Err(UrlError)` - The root could not be parsed or is not crawlable
///
/// # Examples
///
/// ```
/// use sumi_sitemap::url::parse_root_url;
///
/// let root = parse_root_url("example.com/").unwrap();
/// assert_eq!(root.as_str(), "http://example.com");
/// ```
pub fn parse_root_url(raw: &str) -> Result<CanonicalUrl, UrlError> {
    let raw = raw.trim();
    let parse_error = |e: ParseError| UrlError::Parse(format!("{}: {}", raw, e));

    let url = match Url::parse(raw) {
        Ok(url) if !is_host_and_port(&url) => url,
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => {
            tracing::info!("{} has no scheme, defaulting to http", raw);
            Url::parse(&format!("http://{}", raw)).map_err(parse_error)?
        }
        Err(e) => return Err(parse_error(e)),
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(canonicalize(url))
}

/// True for `host:port[/path]`, which parses as scheme `host` followed by
/// an opaque path starting with the port number
fn is_host_and_port(url: &Url) -> bool {
    if !url.cannot_be_a_base() {
        return false;
    }

    let port = url.path().split('/').next().unwrap_or_default();
    !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())
}
