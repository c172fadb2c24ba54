use std::sync::LazyLock;

use ai_client::truncate_to_char_boundary;
use scraper::{Html, Selector};
use url::Url;

use crate::links::resolve_url;
use crate::types::RawMetadata;

/// Only the head of a document matters here; don't parse megabytes of body.
pub const MAX_EXTRACT_BYTES: usize = 512 * 1024;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").expect("valid selector"));
static ICON_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[rel][href]").expect("valid selector"));
static BASE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("base[href]").expect("valid selector"));

/// Extract branding metadata from an HTML document fetched from `page_url`.
///
/// Parsing never fails: malformed markup and missing tags just leave fields
/// empty. Image and icon URLs come back absolute, resolved against the
/// document's `<base href>` when present, otherwise against `page_url`.
pub fn extract_metadata(html: &str, page_url: &Url) -> RawMetadata {
    let html = truncate_to_char_boundary(html, MAX_EXTRACT_BYTES);
    let doc = Html::parse_document(html);
    let base = document_base(&doc, page_url);

    let mut meta = RawMetadata {
        title: doc
            .select(&TITLE)
            .next()
            .and_then(|el| clean(&el.text().collect::<String>())),
        ..RawMetadata::default()
    };

    for el in doc.select(&META) {
        let Some(key) = el.value().attr("name").or_else(|| el.value().attr("property")) else {
            continue;
        };
        let Some(content) = el.value().attr("content").and_then(clean) else {
            continue;
        };

        // First occurrence wins, e.g. light-scheme theme-color before dark.
        let slot = match key.trim().to_ascii_lowercase().as_str() {
            "description" => &mut meta.description,
            "og:description" => &mut meta.og_description,
            "og:site_name" => &mut meta.site_name,
            "theme-color" => &mut meta.theme_color,
            "og:image" | "og:image:url" => {
                if meta.og_image.is_none() {
                    meta.og_image = resolve_url(&base, &content);
                }
                continue;
            }
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(content);
        }
    }

    meta.favicon = find_favicon(&doc, &base);
    meta
}

/// `rel="icon"` (which covers `shortcut icon`) beats `apple-touch-icon`.
fn find_favicon(doc: &Html, base: &Url) -> Option<String> {
    let mut best: Option<(u8, String)> = None;

    for el in doc.select(&ICON_LINK) {
        let (Some(rel), Some(href)) = (el.value().attr("rel"), el.value().attr("href")) else {
            continue;
        };
        let rank = rel
            .split_ascii_whitespace()
            .filter_map(|token| match token.to_ascii_lowercase().as_str() {
                "icon" => Some(0),
                "apple-touch-icon" | "apple-touch-icon-precomposed" => Some(1),
                _ => None,
            })
            .min();
        let Some(rank) = rank else { continue };
        if best.as_ref().is_some_and(|(best_rank, _)| *best_rank <= rank) {
            continue;
        }
        if let Some(resolved) = resolve_url(base, href) {
            best = Some((rank, resolved));
        }
    }

    best.map(|(_, url)| url)
}

fn document_base(doc: &Html, page_url: &Url) -> Url {
    doc.select(&BASE)
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| resolve_url(page_url, href))
        .and_then(|href| Url::parse(&href).ok())
        .unwrap_or_else(|| page_url.clone())
}

/// Collapse runs of whitespace; empty strings become `None`.
fn clean(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}
