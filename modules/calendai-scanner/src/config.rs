use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use ai_client::{Claude, OpenAi, TextGenerator};
use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "calendai-scanner/0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    Anthropic,
    OpenAi,
}

impl AiProvider {
    pub fn default_model(self) -> &'static str {
        match self {
            AiProvider::Anthropic => "claude-haiku-4-5-20251001",
            AiProvider::OpenAi => "gpt-4o-mini",
        }
    }

    fn api_key_var(self) -> &'static str {
        match self {
            AiProvider::Anthropic => "ANTHROPIC_API_KEY",
            AiProvider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl FromStr for AiProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(AiProvider::Anthropic),
            "openai" => Ok(AiProvider::OpenAi),
            other => bail!("unknown AI provider `{other}` (expected `anthropic` or `openai`)"),
        }
    }
}

/// Scanner configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub ai_provider: AiProvider,
    pub ai_api_key: String,
    pub ai_model: String,
    pub fetch_timeout: Duration,
    pub ai_timeout: Duration,
    pub user_agent: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            ai_provider: AiProvider::Anthropic,
            ai_api_key: String::new(),
            ai_model: AiProvider::Anthropic.default_model().to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            ai_timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScannerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. `from_env` is this over the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let ai_provider = match lookup("SCANNER_AI_PROVIDER") {
            Some(value) => value.parse()?,
            None => AiProvider::Anthropic,
        };

        let key_var = ai_provider.api_key_var();
        let ai_api_key = lookup(key_var)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("{key_var} environment variable is required"))?;

        Ok(Self {
            ai_provider,
            ai_api_key,
            ai_model: lookup("SCANNER_AI_MODEL")
                .unwrap_or_else(|| ai_provider.default_model().to_string()),
            fetch_timeout: seconds(&lookup, "SCANNER_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?,
            ai_timeout: seconds(&lookup, "SCANNER_AI_TIMEOUT_SECS", DEFAULT_AI_TIMEOUT_SECS)?,
            user_agent: lookup("SCANNER_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }

    /// The configured provider behind the `TextGenerator` seam.
    pub fn text_generator(&self) -> Arc<dyn TextGenerator> {
        match self.ai_provider {
            AiProvider::Anthropic => Arc::new(Claude::new(&self.ai_api_key, &self.ai_model)),
            AiProvider::OpenAi => Arc::new(OpenAi::new(&self.ai_api_key, &self.ai_model)),
        }
    }

    /// Log the effective configuration without the API key.
    pub fn log_redacted(&self) {
        info!(
            ai_provider = ?self.ai_provider,
            ai_model = self.ai_model.as_str(),
            ai_api_key = redact(&self.ai_api_key),
            fetch_timeout_secs = self.fetch_timeout.as_secs(),
            ai_timeout_secs = self.ai_timeout.as_secs(),
            user_agent = self.user_agent.as_str(),
            "Scanner config loaded"
        );
    }
}

fn seconds(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<Duration> {
    let secs = match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds, got `{raw}`"))?,
        None => default,
    };
    if secs == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

fn redact(secret: &str) -> String {
    match secret.char_indices().nth(4) {
        Some((idx, _)) => format!("{}…", &secret[..idx]),
        None => "****".to_string(),
    }
}
