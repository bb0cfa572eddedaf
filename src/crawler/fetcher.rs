//! Page fetching
//!
//! One GET per page. A response with any status is a completed exchange;
//! only failing to get a response at all (DNS, connect, timeout, reset) or
//! failing to read the body is an error.

use crate::config::UserAgentConfig;
use crate::SitemapError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a completed HTTP exchange
#[derive(Debug)]
pub enum FetchResult {
    /// 2xx response with its decoded body
    Success {
        /// Where the request ended up after redirects
        final_url: String,
        status_code: u16,
        body: String,
    },

    /// Any other status; the body is not read
    HttpError { status_code: u16 },
}

/// Builds the client shared by every worker of a crawl
///
/// Requests identify themselves with `config`'s user agent, accept gzip and
/// brotli bodies, and follow redirects with reqwest's default policy.
///
/// # Example
///
/// ```no_run
/// use sumi_sitemap::config::UserAgentConfig;
/// use sumi_sitemap::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page with a single GET request
///
/// | Outcome | Result |
/// |---------|--------|
/// | 2xx | `Ok(Success)` with the decoded body |
/// | Any other status | `Ok(HttpError)` |
/// | DNS/connect/timeout failure | `Err(SitemapError::Http)` |
/// | Body cannot be decoded | `Err(SitemapError::HtmlParse)` |
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchResult, SitemapError> {
    let transport_error = |source| SitemapError::Http {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(transport_error)?;

    let status_code = response.status().as_u16();
    if !response.status().is_success() {
        return Ok(FetchResult::HttpError { status_code });
    }

    let final_url = response.url().to_string();
    let body = response.text().await.map_err(|e| {
        if e.is_decode() {
            SitemapError::HtmlParse {
                url: url.to_string(),
                message: e.to_string(),
            }
        } else {
            transport_error(e)
        }
    })?;

    Ok(FetchResult::Success {
        final_url,
        status_code,
        body,
    })
}
