use url::Url;

/// Resolve a possibly-relative reference against `base` with standard
/// RFC 3986 joining. Fragments are stripped.
///
/// Returns `None` for empty references and for anything that does not resolve
/// to an http(s) URL (`data:` images, `javascript:` hrefs).
pub fn resolve_url(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    let mut resolved = base.join(reference).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved.to_string())
}
