use anyhow::Result;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use tracing::debug;

use super::types::{ChatRequest, ChatResponse};
use crate::http::{post_json, secret_header};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Thin Chat Completions transport. Request shaping lives in `OpenAi`.
pub(crate) struct OpenAiClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: OPENAI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        debug!(model = %request.model, "OpenAI chat request");

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, secret_header(&format!("Bearer {}", self.api_key))?);

        post_json(&self.http, &format!("{}/chat/completions", self.base_url), headers, request)
            .await
    }
}
