use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::redirect::Policy;
use tracing::{debug, info};
use url::Url;

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 5;
/// Bodies past this size are cut off; metadata lives in the head.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// One fetched document. `url` is the effective URL after redirects and is the
/// base for resolving relative links in `body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: Url,
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// "Fetch a URL, get status and body." Transport failures are `Err`; HTTP
/// error statuses come back as data.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage>;
}

/// Plain HTTP GET via reqwest. No JavaScript rendering.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .user_agent(user_agent)
            .build()
            .context("Failed to build page HTTP client")?;
        Ok(Self { client })
    }
}

/// Encoding named by the `charset` parameter of a `Content-Type` value.
fn charset_encoding(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Encoding::for_label(value.trim().trim_matches('"').as_bytes())
    })
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        info!(url = %url, fetcher = "http", "Fetching page");

        let mut response = self
            .client
            .get(url.as_str())
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .context("Page request failed")?;

        let status = response.status();
        let final_url = response.url().clone();
        let encoding = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_encoding)
            .unwrap_or(UTF_8);

        if !status.is_success() {
            debug!(url = %final_url, status = status.as_u16(), "Non-success status, skipping body");
            return Ok(FetchedPage {
                url: final_url,
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.context("Failed to read page body")? {
            let room = MAX_BODY_BYTES - bytes.len();
            if chunk.len() >= room {
                bytes.extend_from_slice(&chunk[..room]);
                debug!(url = %final_url, limit = MAX_BODY_BYTES, "Page body truncated");
                break;
            }
            bytes.extend_from_slice(&chunk);
        }

        // A byte-order mark overrides the declared charset.
        let (body, used, had_errors) = encoding.decode(&bytes);
        if had_errors {
            debug!(url = %final_url, encoding = used.name(), "Page body had undecodable bytes");
        }
        let body = body.into_owned();
        info!(url = %final_url, fetcher = "http", bytes = body.len(), "Fetched successfully");

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            body,
        })
    }
}
