// Test doubles for the two outbound seams of the scanner.
//
// - MockFetcher (PageFetcher): HashMap-based URL to response, records requests
// - MockGenerator (TextGenerator): fixed reply or failure, records prompts
//
// No network, no model. Both are deterministic across repeated calls.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use ai_client::TextGenerator;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use url::Url;

use crate::fetcher::{FetchedPage, PageFetcher};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum MockPage {
    Response {
        status: u16,
        body: String,
        final_url: Option<String>,
    },
    Error(String),
}

/// Returns `Err` for unregistered URLs.
/// Builder pattern: `.on_page()`, `.on_status()`, `.on_error()`, `.on_redirect()`.
pub struct MockFetcher {
    pages: HashMap<String, MockPage>,
    delay: Option<Duration>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on_page(self, url: &str, html: &str) -> Self {
        self.register(
            url,
            MockPage::Response {
                status: 200,
                body: html.to_string(),
                final_url: None,
            },
        )
    }

    pub fn on_status(self, url: &str, status: u16) -> Self {
        self.register(
            url,
            MockPage::Response {
                status,
                body: String::new(),
                final_url: None,
            },
        )
    }

    pub fn on_error(self, url: &str, message: &str) -> Self {
        self.register(url, MockPage::Error(message.to_string()))
    }

    /// Serve `html` as if `url` redirected to `final_url`.
    pub fn on_redirect(self, url: &str, final_url: &str, html: &str) -> Self {
        self.register(
            url,
            MockPage::Response {
                status: 200,
                body: html.to_string(),
                final_url: Some(final_url.to_string()),
            },
        )
    }

    /// Sleep before answering every request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn register(mut self, url: &str, page: MockPage) -> Self {
        self.pages.insert(canonical(url), page);
        self
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn canonical(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        self.requests.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.pages.get(url.as_str()).cloned() {
            Some(MockPage::Response {
                status,
                body,
                final_url,
            }) => {
                let url = match final_url {
                    Some(final_url) => Url::parse(&final_url)?,
                    None => url.clone(),
                };
                Ok(FetchedPage { url, status, body })
            }
            Some(MockPage::Error(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("MockFetcher: no page registered for {url}")),
        }
    }
}

// ---------------------------------------------------------------------------
// MockGenerator
// ---------------------------------------------------------------------------

/// Fixed-reply text generator that records every prompt it is sent.
pub struct MockGenerator {
    reply: std::result::Result<String, String>,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    /// Answer every request with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with `reply` serialized as JSON.
    pub fn replying_json(reply: serde_json::Value) -> Self {
        Self::replying(reply.to_string())
    }

    /// Fail every request with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// User prompts received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, _system: &str, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.reply.clone().map_err(|message| anyhow!(message))
    }

    fn provider(&self) -> &'static str {
        "mock"
    }
}
