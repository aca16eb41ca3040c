//! Content-type-aware response conversion.
//!
//! Routes response bytes to the appropriate handler based on the
//! `Content-Type` header. Each handler implements [`ContentHandler`] to
//! convert raw bytes into markdown for downstream text consumers.
//!
//! # Supported Content Types
//!
//! | Type | Handler | Feature Flag |
//! |------|---------|-------------|
//! | `text/html`, `application/xhtml+xml` | [`html::HtmlHandler`] | always |
//! | `application/pdf` | [`pdf::PdfHandler`] | `pdf` (or any custom [`pdf::DocumentParser`]) |
//!
//! # Example
//!
//! ```rust
//! use webfetch::content::ContentRouter;
//!
//! let router = ContentRouter::new();
//! let html = b"<html><body><h1>Hello</h1></body></html>";
//! let result = router.convert(html, "text/html", None).unwrap();
//! assert!(result.markdown.contains("Hello"));
//! ```

pub mod error;
pub mod guard;
pub mod html;
pub mod pdf;
#[cfg(feature = "pdf")]
pub mod pdfium;
pub mod pool;
pub mod reconstruct;
pub mod schedule;
pub mod types;

use anyhow::{bail, Result};
use serde::Serialize;
use url::Url;

pub use error::ExtractError;
pub use html::is_html_content_type;
pub use pdf::{is_pdf_content_type, DocumentParser, PdfExtractor, PdfHandler};

/// Metadata about a content conversion result.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    /// The converted markdown content.
    pub markdown: String,
    /// Number of pages (for paginated formats like PDF).
    pub page_count: Option<usize>,
    /// Original content type.
    pub content_type: String,
    /// Conversion time in milliseconds.
    pub elapsed_ms: f64,
}

/// Appended to markdown cut short by [`truncate_markdown`].
pub const TRUNCATION_NOTICE: &str = "\n\n... (truncated)";

/// Cap `markdown` at `max_len` bytes, appending [`TRUNCATION_NOTICE`] when
/// anything was cut. The cut backs off to the nearest char boundary so a
/// multi-byte character is never split. `max_len == 0` means no limit.
///
/// Returns whether the text was truncated.
pub fn truncate_markdown(markdown: &mut String, max_len: usize) -> bool {
    if max_len == 0 || markdown.len() <= max_len {
        return false;
    }
    let mut cut = max_len;
    while !markdown.is_char_boundary(cut) {
        cut -= 1;
    }
    markdown.truncate(cut);
    markdown.push_str(TRUNCATION_NOTICE);
    true
}

/// Converts response bytes into markdown.
///
/// Implementations are synchronous. PDF extraction fans out over the rayon
/// pool internally and blocks the caller until every page is done.
pub trait ContentHandler: Send + Sync {
    /// MIME types this handler supports (e.g., `["text/html"]`).
    fn supported_types(&self) -> &[&str];

    /// Whether a full `Content-Type` header value (possibly carrying
    /// parameters like `; charset=utf-8`) belongs to this handler.
    fn accepts(&self, content_type: &str) -> bool {
        let ct = content_type.to_lowercase();
        self.supported_types().iter().any(|t| ct.contains(t))
    }

    /// Convert raw response bytes to markdown.
    ///
    /// `source` is the URL the bytes came from, used to resolve relative
    /// links where the format has them.
    fn to_markdown(
        &self,
        bytes: &[u8],
        content_type: &str,
        source: Option<&Url>,
    ) -> Result<ConversionResult>;
}

/// Routes response bytes to the appropriate [`ContentHandler`] based on
/// the `Content-Type` header.
pub struct ContentRouter {
    handlers: Vec<Box<dyn ContentHandler>>,
}

impl ContentRouter {
    /// Create a router with all available handlers.
    ///
    /// The pdfium-backed PDF handler is included only when the `pdf`
    /// feature flag is enabled.
    pub fn new() -> Self {
        Self::with_config(&crate::config::ExtractConfig::default())
    }

    /// Create a router whose PDF handler (if compiled in) uses `config`.
    #[cfg_attr(not(feature = "pdf"), allow(unused_variables))]
    pub fn with_config(config: &crate::config::ExtractConfig) -> Self {
        #[cfg(feature = "pdf")]
        let handlers: Vec<Box<dyn ContentHandler>> = vec![
            Box::new(PdfHandler::pdfium(config.clone())),
            Box::new(html::HtmlHandler),
        ];

        #[cfg(not(feature = "pdf"))]
        let handlers: Vec<Box<dyn ContentHandler>> = vec![Box::new(html::HtmlHandler)];

        Self { handlers }
    }

    /// Register an extra handler. Later handlers take precedence.
    #[must_use]
    pub fn with_handler(mut self, handler: Box<dyn ContentHandler>) -> Self {
        self.handlers.insert(0, handler);
        self
    }

    /// Find the handler for a content type, if any.
    pub fn handler_for(&self, content_type: &str) -> Option<&dyn ContentHandler> {
        for handler in &self.handlers {
            if handler.accepts(content_type) {
                return Some(&**handler);
            }
        }
        None
    }

    /// Find a handler for the given content type and convert the bytes.
    pub fn convert(
        &self,
        bytes: &[u8],
        content_type: &str,
        source: Option<&Url>,
    ) -> Result<ConversionResult> {
        match self.handler_for(content_type) {
            Some(handler) => handler.to_markdown(bytes, content_type, source),
            None => bail!("unsupported content type: {content_type} (expected HTML or PDF)"),
        }
    }
}

impl Default for ContentRouter {
    fn default() -> Self {
        Self::new()
    }
}
