use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{Result, ScanError};

/// `scheme:rest` per RFC 3986 section 3.1.
static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):(.*)$").expect("valid regex")
});

/// What follows `host:` when the colon introduces a port, not a scheme.
static PORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:[/?#]|$)").expect("valid regex"));

/// Scheme words that are never read as a bare hostname, so `javascript:80`
/// is rejected rather than taken for host `javascript` on port 80.
const NON_WEB_SCHEMES: &[&str] = &[
    "about", "blob", "data", "file", "filesystem", "ftp", "javascript", "mailto", "sms",
    "tel", "vbscript", "ws", "wss",
];

/// Turn user input into an absolute http(s) URL, or reject it.
///
/// Bare hosts (`acme.com`, `acme.com/about`, `localhost:3000`) get `https://`
/// prepended. Any other scheme, `javascript:` and `data:` included, is rejected
/// here so nothing downstream ever sees it.
pub fn normalize_url(input: &str) -> Result<Url> {
    // URL parsers drop ASCII tab/newline anywhere in the input, so the scheme
    // check must see the same string the parser will.
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();

    if cleaned.is_empty() {
        return Err(ScanError::InvalidUrl("empty input".to_string()));
    }

    let candidate = if has_scheme(&cleaned) {
        cleaned
    } else {
        format!("https://{}", cleaned.trim_start_matches('/'))
    };

    let url = Url::parse(&candidate)
        .map_err(|e| ScanError::InvalidUrl(format!("{candidate}: {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ScanError::InvalidUrl(format!(
                "scheme `{other}` is not allowed"
            )))
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ScanError::InvalidUrl(format!("{candidate}: missing host")));
    }

    Ok(url)
}

fn has_scheme(input: &str) -> bool {
    let Some(caps) = SCHEME_RE.captures(input) else {
        return false;
    };
    let scheme = caps[1].to_ascii_lowercase();
    NON_WEB_SCHEMES.contains(&scheme.as_str()) || !PORT_RE.is_match(&caps[2])
}
