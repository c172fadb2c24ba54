use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// TextGenerator Trait
// =============================================================================

/// A single-shot text generation backend: one system prompt, one user prompt,
/// one text reply. Implementations make exactly one request per call.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;

    /// Provider label used in logs.
    fn provider(&self) -> &'static str;
}
