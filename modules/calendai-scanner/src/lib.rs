pub mod config;
pub mod enrichment;
pub mod error;
pub mod fetcher;
pub mod links;
pub mod metadata;
pub mod normalize;
pub mod scanner;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod types;

pub use config::{AiProvider, ScannerConfig};
pub use enrichment::{Enricher, Enrichment};
pub use error::{Result, ScanError};
pub use fetcher::{FetchedPage, HttpFetcher, PageFetcher};
pub use links::resolve_url;
pub use metadata::extract_metadata;
pub use normalize::normalize_url;
pub use scanner::WebsiteScanner;
pub use types::{Branding, RawMetadata, ScanResult};
