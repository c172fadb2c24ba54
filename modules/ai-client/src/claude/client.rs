use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use super::types::{ChatRequest, ChatResponse};
use crate::http::{post_json, secret_header};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Thin Messages API transport. Request shaping lives in `Claude`.
pub(crate) struct ClaudeClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl ClaudeClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        debug!(model = %request.model, "Claude chat request");

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", secret_header(&self.api_key)?);
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));

        post_json(&self.http, &format!("{}/messages", self.base_url), headers, request).await
    }
}
