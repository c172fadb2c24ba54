use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use calendai_scanner::{ScannerConfig, WebsiteScanner};

/// Scan a business website and print the suggested booking-page setup as JSON.
#[derive(Parser, Debug)]
#[command(name = "calendai-scan", version)]
struct Cli {
    /// Website address, with or without scheme (e.g. `acme.com`).
    url: String,

    /// Pretty-print the JSON result.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("calendai_scanner=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ScannerConfig::from_env()?;
    config.log_redacted();

    let scanner = WebsiteScanner::from_config(&config)?;
    let result = scanner.scan_website(&cli.url).await;

    if let Some(ref warning) = result.warning {
        info!(warning = warning.as_str(), "Scan completed with a warning");
    }

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");

    Ok(())
}
