/// Result type alias for scanner stages.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Stage failures. None of these cross `WebsiteScanner::scan_website`; each one
/// becomes the `warning` of a `ScanResult`.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("URL is not valid: {0}")]
    InvalidUrl(String),

    #[error("Could not reach {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("AI analysis failed: {0}")]
    EnrichmentFailed(String),
}

impl ScanError {
    /// User-facing warning text. Details stay in the logs.
    pub fn warning(&self) -> String {
        match self {
            ScanError::InvalidUrl(_) => {
                "The URL you entered is not valid. Please enter an http or https website address."
                    .to_string()
            }
            ScanError::Unreachable { url, .. } => {
                format!("Could not reach {url}. Check the address and try again.")
            }
            ScanError::EnrichmentFailed(_) => {
                "AI analysis failed, so only details read directly from the page were filled in."
                    .to_string()
            }
        }
    }

    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::InvalidUrl(_) => "invalid_url",
            ScanError::Unreachable { .. } => "unreachable",
            ScanError::EnrichmentFailed(_) => "enrichment_failed",
        }
    }
}
