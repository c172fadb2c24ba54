use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

use ai_client::{extract_json_object, strip_code_blocks, truncate_to_char_boundary, TextGenerator};
use serde::{Deserialize, Deserializer};
use tracing::debug;
use url::Url;

use crate::error::{Result, ScanError};
use crate::types::{Branding, RawMetadata, ScanResult};

/// Byte cap on any free-text field copied into the prompt. URLs are never cut.
const MAX_FIELD_BYTES: usize = 600;

pub const SYSTEM_PROMPT: &str = r##"You are a brand analyst for a meeting scheduling product. Given metadata scraped from a business's website, describe the business so its booking page can be set up automatically.

Respond with a single JSON object and nothing else. Use exactly these keys:
- businessName: the business's name as customers know it (not the page title boilerplate)
- description: one or two sentences on what the business does
- suggestedEventDescription: a short, friendly description for a first meeting or consultation booked with this business
- primaryColor: the main brand color as a hex code like "#1a2b3c"
- secondaryColor: an accent color as a hex code, or null
- logoUrl: an absolute URL of the best logo image; prefer one of the URLs listed in the metadata, or null

Use null for anything you cannot determine. Do not invent URLs."##;

/// Model output. Every field is optional; non-string values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    #[serde(default, deserialize_with = "optional_text")]
    pub business_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub suggested_event_description: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub primary_color: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub secondary_color: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub logo_url: Option<String>,
}

impl Enrichment {
    /// Model values win; whatever the model left empty falls back to the page.
    pub fn merge(self, raw: &RawMetadata) -> ScanResult {
        let fallback = ScanResult::from_metadata(raw);
        ScanResult {
            business_name: self.business_name.or(fallback.business_name),
            description: self.description.or(fallback.description),
            suggested_event_description: self.suggested_event_description,
            branding: Branding {
                logo_url: self.logo_url.or(fallback.branding.logo_url),
                primary_color: self.primary_color.or(fallback.branding.primary_color),
                secondary_color: self.secondary_color,
            },
            warning: None,
        }
    }
}

fn optional_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

/// Build the user prompt. The page URL and every resolved image URL appear
/// verbatim so the model can hand one back as `logoUrl`.
pub fn build_prompt(page_url: &Url, raw: &RawMetadata) -> String {
    let mut prompt = format!("Website: {page_url}\n\nMetadata from the homepage:\n");

    push_text(&mut prompt, "Title", raw.title.as_deref());
    push_text(&mut prompt, "Site name", raw.site_name.as_deref());
    push_text(&mut prompt, "Meta description", raw.description.as_deref());
    push_text(&mut prompt, "Open Graph description", raw.og_description.as_deref());
    push_url(&mut prompt, "Favicon URL", raw.favicon.as_deref());
    push_url(&mut prompt, "Open Graph image URL", raw.og_image.as_deref());
    push_text(&mut prompt, "Theme color", raw.theme_color.as_deref());

    prompt.push_str("\nReturn the JSON object now.");
    prompt
}

fn push_text(prompt: &mut String, label: &str, value: Option<&str>) {
    let value = value.map(|v| truncate_to_char_boundary(v, MAX_FIELD_BYTES));
    let _ = writeln!(prompt, "- {label}: {}", value.unwrap_or("(not found)"));
}

fn push_url(prompt: &mut String, label: &str, value: Option<&str>) {
    let _ = writeln!(prompt, "- {label}: {}", value.unwrap_or("(not found)"));
}

/// Parse a model reply into an `Enrichment`. Tolerates Markdown fences and
/// prose around the object. Arrays, scalars and anything unparseable are
/// `EnrichmentFailed`.
pub fn parse_enrichment(reply: &str) -> Result<Enrichment> {
    let stripped = strip_code_blocks(reply);

    let value = match serde_json::from_str::<serde_json::Value>(stripped) {
        Ok(value) => value,
        Err(_) if stripped.starts_with('[') => {
            return Err(ScanError::EnrichmentFailed(
                "model reply was a JSON array, expected an object".to_string(),
            ))
        }
        Err(_) => {
            let json = extract_json_object(stripped).ok_or_else(|| {
                ScanError::EnrichmentFailed("model reply contained no JSON object".to_string())
            })?;
            serde_json::from_str(json).map_err(|e| {
                ScanError::EnrichmentFailed(format!("model reply was not valid JSON: {e}"))
            })?
        }
    };

    if !value.is_object() {
        return Err(ScanError::EnrichmentFailed(
            "model reply was JSON but not an object".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| ScanError::EnrichmentFailed(format!("model reply had the wrong shape: {e}")))
}

/// Runs the AI step against any `TextGenerator`, bounded by a timeout.
#[derive(Clone)]
pub struct Enricher {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl Enricher {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn enrich(&self, page_url: &Url, raw: &RawMetadata) -> Result<Enrichment> {
        let prompt = build_prompt(page_url, raw);
        debug!(provider = self.generator.provider(), prompt_len = prompt.len(), "Requesting AI analysis");

        let reply = tokio::time::timeout(self.timeout, self.generator.generate(SYSTEM_PROMPT, &prompt))
            .await
            .map_err(|_| {
                ScanError::EnrichmentFailed(format!(
                    "{} did not respond within {}s",
                    self.generator.provider(),
                    self.timeout.as_secs_f32()
                ))
            })?
            .map_err(|e| ScanError::EnrichmentFailed(format!("{e:#}")))?;

        parse_enrichment(&reply)
    }
}
