//! `webfetch` - Fetch any URL as clean markdown
//!
//! # Features
//!
//! - **HTML**: non-content elements stripped, relative links made absolute
//! - **PDF**: text reconstructed from glyph positions, pages extracted in
//!   parallel and reassembled in order under a 100MB ingestion ceiling
//! - **Pluggable parsing**: bring your own [`content::DocumentParser`], or
//!   enable the `pdf` feature for the pdfium-backed one
//!
//! # Example
//!
//! ```rust,no_run
//! use webfetch::{Config, Fetcher};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = Fetcher::new(&Config::default())?;
//!     let result = fetcher.fetch_and_convert("https://example.com").await?;
//!     println!("{}", result.markdown);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod content;
pub mod http_client;

pub use config::{Config, ExtractConfig, FetchConfig};
pub use content::{ContentHandler, ContentRouter, ConversionResult, ExtractError, PdfExtractor};
pub use http_client::{FetchError, Fetcher};

/// Version of webfetch
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
