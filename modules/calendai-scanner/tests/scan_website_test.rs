//! End-to-end tests of `WebsiteScanner::scan_website` with both outbound
//! seams replaced by `MockFetcher` and `MockGenerator`.

use std::sync::Arc;
use std::time::Duration;

use calendai_scanner::testing::{MockFetcher, MockGenerator};
use calendai_scanner::{Branding, ScanResult, ScannerConfig, WebsiteScanner};
use serde_json::json;

const ACME_HTML: &str = r##"<!doctype html>
<html>
  <head>
    <title>Acme Corp</title>
    <meta name="description" content="Acme builds rockets for small teams.">
    <meta property="og:image" content="https://acme.com/og.png">
    <link rel="icon" href="/favicon.ico">
    <meta name="theme-color" content="#222222">
  </head>
  <body><h1>Acme</h1></body>
</html>"##;

fn scanner(fetcher: &Arc<MockFetcher>, generator: &Arc<MockGenerator>) -> WebsiteScanner {
    scanner_with(fetcher, generator, ScannerConfig::default())
}

fn scanner_with(
    fetcher: &Arc<MockFetcher>,
    generator: &Arc<MockGenerator>,
    config: ScannerConfig,
) -> WebsiteScanner {
    WebsiteScanner::new(fetcher.clone(), generator.clone(), &config)
}

fn acme_reply() -> serde_json::Value {
    json!({
        "businessName": "Acme Corp",
        "description": "Rockets for small teams.",
        "suggestedEventDescription": "A 30-minute intro call with the Acme team.",
        "primaryColor": "#ff5500",
        "secondaryColor": "#1a1a1a",
        "logoUrl": "https://acme.com/og.png"
    })
}

// --- URL validation ---

#[tokio::test]
async fn unsafe_schemes_are_rejected_without_network_calls() {
    let fetcher = Arc::new(MockFetcher::new());
    let generator = Arc::new(MockGenerator::replying_json(acme_reply()));
    let scanner = scanner(&fetcher, &generator);

    for input in [
        "javascript:alert(1)",
        "data:text/html,<script>alert(1)</script>",
        "file:///etc/passwd",
        "vbscript:msgbox(1)",
        "ftp://acme.com",
    ] {
        let result = scanner.scan_website(input).await;
        let warning = result.warning.clone().unwrap_or_default();
        assert!(warning.contains("not valid"), "{input}: {warning}");
        assert!(result.is_blank(), "{input} produced content: {result:?}");
    }

    assert!(fetcher.requests().is_empty());
    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn bare_hostname_is_fetched_over_https() {
    let fetcher = Arc::new(MockFetcher::new().on_page("https://acme.com/", ACME_HTML));
    let generator = Arc::new(MockGenerator::replying_json(acme_reply()));

    let result = scanner(&fetcher, &generator).scan_website("acme.com").await;

    let requests = fetcher.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("https://"));
    assert!(requests[0].contains("acme.com"));
    assert!(result.warning.is_none());
}

// --- Fetch failures ---

#[tokio::test]
async fn network_error_reports_unreachable() {
    let fetcher = Arc::new(MockFetcher::new().on_error("https://down.example/", "connection refused"));
    let generator = Arc::new(MockGenerator::replying_json(acme_reply()));

    let result = scanner(&fetcher, &generator)
        .scan_website("https://down.example")
        .await;

    assert!(result.warning.as_deref().unwrap().contains("Could not reach"));
    assert!(result.is_blank());
    assert!(generator.prompts().is_empty(), "AI must not run after a fetch failure");
}

#[tokio::test]
async fn non_success_status_reports_unreachable() {
    for status in [404, 500, 503] {
        let fetcher = Arc::new(MockFetcher::new().on_status("https://acme.com/missing", status));
        let generator = Arc::new(MockGenerator::replying_json(acme_reply()));

        let result = scanner(&fetcher, &generator)
            .scan_website("https://acme.com/missing")
            .await;

        assert!(result.warning.as_deref().unwrap().contains("Could not reach"));
        assert_eq!(result.business_name, None);
        assert_eq!(result.description, None);
        assert_eq!(result.suggested_event_description, None);
        assert_eq!(result.branding, Branding::default());
        assert!(generator.prompts().is_empty());
    }
}

#[tokio::test]
async fn slow_site_times_out_as_unreachable() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_page("https://slow.example/", ACME_HTML)
            .with_delay(Duration::from_secs(5)),
    );
    let generator = Arc::new(MockGenerator::replying_json(acme_reply()));
    let config = ScannerConfig {
        fetch_timeout: Duration::from_millis(50),
        ..ScannerConfig::default()
    };

    let result = scanner_with(&fetcher, &generator, config)
        .scan_website("slow.example")
        .await;

    assert!(result.warning.as_deref().unwrap().contains("Could not reach"));
    assert!(result.is_blank());
}

// --- AI enrichment ---

#[tokio::test]
async fn ai_values_win_on_success() {
    let fetcher = Arc::new(MockFetcher::new().on_page("https://acme.com/", ACME_HTML));
    let generator = Arc::new(MockGenerator::replying_json(acme_reply()));

    let result = scanner(&fetcher, &generator)
        .scan_website("https://acme.com")
        .await;

    assert_eq!(
        result,
        ScanResult {
            business_name: Some("Acme Corp".into()),
            description: Some("Rockets for small teams.".into()),
            suggested_event_description: Some("A 30-minute intro call with the Acme team.".into()),
            branding: Branding {
                logo_url: Some("https://acme.com/og.png".into()),
                primary_color: Some("#ff5500".into()),
                secondary_color: Some("#1a1a1a".into()),
            },
            warning: None,
        }
    );

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Acme Corp"));
    assert!(prompts[0].contains("https://acme.com/og.png"));
}

#[tokio::test]
async fn ai_failure_falls_back_to_page_metadata() {
    let html = r##"<html><head>
        <title>Fallback Co</title>
        <meta name="description" content="Plumbing since 1990.">
        <meta name="theme-color" content="#0077cc">
        <link rel="icon" href="/icon.png">
    </head></html>"##;
    let fetcher = Arc::new(MockFetcher::new().on_page("https://fallback.co/", html));
    let generator = Arc::new(MockGenerator::failing("model overloaded"));

    let result = scanner(&fetcher, &generator)
        .scan_website("fallback.co")
        .await;

    assert_eq!(result.business_name.as_deref(), Some("Fallback Co"));
    assert_eq!(result.description.as_deref(), Some("Plumbing since 1990."));
    assert_eq!(result.branding.primary_color.as_deref(), Some("#0077cc"));
    assert_eq!(result.branding.logo_url.as_deref(), Some("https://fallback.co/icon.png"));
    assert_eq!(result.suggested_event_description, None);
    assert_eq!(result.branding.secondary_color, None);
    assert!(result.warning.as_deref().unwrap().contains("AI analysis failed"));
}

#[tokio::test]
async fn unparseable_ai_reply_falls_back() {
    let fetcher = Arc::new(MockFetcher::new().on_page("https://acme.com/", ACME_HTML));
    let generator = Arc::new(MockGenerator::replying("I'm sorry, I can't help with that."));

    let result = scanner(&fetcher, &generator).scan_website("acme.com").await;

    assert!(result.warning.as_deref().unwrap().contains("AI analysis failed"));
    assert_eq!(result.business_name.as_deref(), Some("Acme Corp"));
    assert_eq!(result.branding.primary_color.as_deref(), Some("#222222"));
    assert_eq!(
        result.branding.logo_url.as_deref(),
        Some("https://acme.com/favicon.ico")
    );
}

#[tokio::test]
async fn ai_fallback_with_bare_page_leaves_fields_empty() {
    let fetcher = Arc::new(MockFetcher::new().on_page("https://bare.example/", "<p>hello</p>"));
    let generator = Arc::new(MockGenerator::failing("boom"));

    let result = scanner(&fetcher, &generator).scan_website("bare.example").await;

    assert!(result.warning.as_deref().unwrap().contains("AI analysis failed"));
    assert!(result.is_blank());
}

#[tokio::test]
async fn slow_ai_times_out_and_falls_back() {
    let fetcher = Arc::new(MockFetcher::new().on_page("https://acme.com/", ACME_HTML));
    let generator = Arc::new(
        MockGenerator::replying_json(acme_reply()).with_delay(Duration::from_secs(5)),
    );
    let config = ScannerConfig {
        ai_timeout: Duration::from_millis(50),
        ..ScannerConfig::default()
    };

    let result = scanner_with(&fetcher, &generator, config)
        .scan_website("acme.com")
        .await;

    assert!(result.warning.as_deref().unwrap().contains("AI analysis failed"));
    assert_eq!(result.business_name.as_deref(), Some("Acme Corp"));
}

#[tokio::test]
async fn partial_ai_reply_is_filled_from_page() {
    let fetcher = Arc::new(MockFetcher::new().on_page("https://acme.com/", ACME_HTML));
    let generator = Arc::new(MockGenerator::replying(
        "```json\n{\"businessName\": \"ACME\", \"primaryColor\": null}\n```",
    ));

    let result = scanner(&fetcher, &generator).scan_website("acme.com").await;

    assert!(result.warning.is_none());
    assert_eq!(result.business_name.as_deref(), Some("ACME"));
    assert_eq!(result.branding.primary_color.as_deref(), Some("#222222"));
    assert_eq!(
        result.description.as_deref(),
        Some("Acme builds rockets for small teams.")
    );
}

// --- URL resolution ---

#[tokio::test]
async fn relative_favicon_is_resolved_before_prompting() {
    let html = r#"<html><head><title>Example</title><link rel="icon" href="/logo.png"></head></html>"#;
    let fetcher = Arc::new(MockFetcher::new().on_page("https://example.com/", html));
    let generator = Arc::new(MockGenerator::replying_json(json!({
        "businessName": "Example",
        "logoUrl": "https://example.com/logo.png"
    })));

    let result = scanner(&fetcher, &generator)
        .scan_website("https://example.com")
        .await;

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("https://example.com/logo.png"));
    assert_eq!(
        result.branding.logo_url.as_deref(),
        Some("https://example.com/logo.png")
    );
}

#[tokio::test]
async fn links_resolve_against_the_redirect_target() {
    let html = r#"<html><head><title>Acme</title><link rel="icon" href="icon.png"></head></html>"#;
    let fetcher = Arc::new(MockFetcher::new().on_redirect(
        "https://acme.com/",
        "https://www.acme.com/home/",
        html,
    ));
    let generator = Arc::new(MockGenerator::failing("offline"));

    let result = scanner(&fetcher, &generator).scan_website("acme.com").await;

    assert_eq!(
        result.branding.logo_url.as_deref(),
        Some("https://www.acme.com/home/icon.png")
    );
}

// --- Statelessness ---

#[tokio::test]
async fn repeated_scans_are_identical() {
    let fetcher = Arc::new(MockFetcher::new().on_page("https://acme.com/", ACME_HTML));
    let generator = Arc::new(MockGenerator::replying_json(acme_reply()));
    let scanner = scanner(&fetcher, &generator);

    let first = scanner.scan_website("acme.com").await;
    let second = scanner.scan_website("acme.com").await;

    assert_eq!(first, second);
    assert_eq!(fetcher.requests().len(), 2);
    let prompts = generator.prompts();
    assert_eq!(prompts[0], prompts[1]);
}

#[tokio::test]
async fn concurrent_scans_do_not_interfere() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .on_page("https://acme.com/", ACME_HTML)
            .on_status("https://gone.example/", 410),
    );
    let generator = Arc::new(MockGenerator::replying_json(acme_reply()));
    let scanner = scanner(&fetcher, &generator);

    let (ok, gone, bad) = tokio::join!(
        scanner.scan_website("acme.com"),
        scanner.scan_website("gone.example"),
        scanner.scan_website("javascript:alert(1)"),
    );

    assert!(ok.warning.is_none());
    assert_eq!(ok.branding.primary_color.as_deref(), Some("#ff5500"));
    assert!(gone.warning.as_deref().unwrap().contains("Could not reach"));
    assert!(bad.warning.as_deref().unwrap().contains("not valid"));
    assert_eq!(fetcher.requests().len(), 2);
}

#[tokio::test]
async fn result_serializes_for_the_web_app() {
    let fetcher = Arc::new(MockFetcher::new().on_page("https://acme.com/", ACME_HTML));
    let generator = Arc::new(MockGenerator::replying_json(acme_reply()));

    let result = scanner(&fetcher, &generator).scan_website("acme.com").await;
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["businessName"], "Acme Corp");
    assert_eq!(json["branding"]["primaryColor"], "#ff5500");
    assert!(json.get("warning").is_none());
}
