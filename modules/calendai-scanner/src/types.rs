use serde::{Deserialize, Serialize};

/// Brand assets shown on the booking page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub logo_url: Option<String>,
    /// Hex color, e.g. `#ff5500`.
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
}

/// What a website scan hands back to the event-type onboarding flow.
///
/// `warning` is set whenever the scan degraded. When the URL was rejected or the
/// site could not be fetched every other field is `None`; when only the AI step
/// failed the fields hold whatever the page metadata provided.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub suggested_event_description: Option<String>,
    pub branding: Branding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ScanResult {
    /// An all-empty result carrying only a warning.
    pub fn empty_with_warning(warning: impl Into<String>) -> Self {
        Self {
            warning: Some(warning.into()),
            ..Self::default()
        }
    }

    /// Result built from page metadata alone.
    pub fn from_metadata(raw: &RawMetadata) -> Self {
        Self {
            business_name: raw.business_name().map(str::to_string),
            description: raw.summary().map(str::to_string),
            suggested_event_description: None,
            branding: Branding {
                logo_url: raw.logo_url().map(str::to_string),
                primary_color: raw.theme_color.clone(),
                secondary_color: None,
            },
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// True when no content or branding field is populated.
    pub fn is_blank(&self) -> bool {
        self.business_name.is_none()
            && self.description.is_none()
            && self.suggested_event_description.is_none()
            && self.branding == Branding::default()
    }
}

/// Metadata read from one fetched HTML document. URL fields are already absolute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub og_image: Option<String>,
    pub og_description: Option<String>,
    pub site_name: Option<String>,
    pub favicon: Option<String>,
    pub theme_color: Option<String>,
}

impl RawMetadata {
    pub fn business_name(&self) -> Option<&str> {
        self.title.as_deref().or(self.site_name.as_deref())
    }

    pub fn summary(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or(self.og_description.as_deref())
    }

    pub fn logo_url(&self) -> Option<&str> {
        self.favicon.as_deref().or(self.og_image.as_deref())
    }
}
