//! PDF to Markdown conversion handler.
//!
//! Turns a PDF into page-delimited markdown by reconstructing text from
//! positioned fragments, one page range per worker.
//!
//! # Pipeline
//!
//! ```text
//! bytes → size guard → container parse → range plan → workers (rayon) → assemble
//! ```
//!
//! Workers share the parsed [`Document`] read-only and each writes into its
//! own pooled range buffer, so the parallel phase needs no locking. Ranges
//! are planned in ascending page order, which lets the assembler join the
//! buffers by worker index and still emit pages in order.
//!
//! # Output
//!
//! ```text
//! ## Page 1
//!
//! <text>
//!
//! ---
//!
//! ## Page 2
//!
//! <text>
//! ```

use std::fmt::Write as _;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result as AnyResult;
use tracing::{debug, info, instrument, trace};
use url::Url;

use super::error::{ExtractError, Result};
use super::guard::SizeGuard;
use super::pool::{BufferPool, Pooled, DOCUMENT_BUFFER_CAPACITY, RANGE_BUFFER_CAPACITY};
use super::reconstruct::{reconstruct_into, Thresholds, PAGE_NOT_FOUND_MARKER};
use super::schedule::{plan_ranges, PageRange};
use super::types::Document;
use super::{ContentHandler, ConversionResult};
use crate::config::ExtractConfig;

/// Separator between consecutive page blocks.
pub const PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Turns raw container bytes into a navigable [`Document`].
///
/// Implementations must be deterministic: the same bytes always yield the
/// same pages and fragments.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<Document>;
}

/// Result of extracting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub page_count: usize,
}

/// Long-lived extraction engine owning its scratch buffer pools.
pub struct PdfExtractor {
    parser: Arc<dyn DocumentParser>,
    config: ExtractConfig,
    documents: BufferPool<Vec<u8>>,
    ranges: BufferPool<String>,
    cancel: Option<Arc<AtomicBool>>,
}

impl PdfExtractor {
    pub fn new(parser: Arc<dyn DocumentParser>) -> Self {
        Self {
            parser,
            config: ExtractConfig::default(),
            documents: BufferPool::new(DOCUMENT_BUFFER_CAPACITY),
            ranges: BufferPool::new(RANGE_BUFFER_CAPACITY),
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ExtractConfig) -> Self {
        self.config = config;
        self
    }

    /// Stop between pages once `flag` is set; the call then fails with
    /// [`ExtractError::Cancelled`].
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn size_guard(&self) -> SizeGuard {
        SizeGuard::new(self.config.max_document_bytes)
    }

    /// Pool backing whole-document ingestion buffers.
    pub fn document_pool(&self) -> &BufferPool<Vec<u8>> {
        &self.documents
    }

    /// Pool backing per-range text buffers.
    pub fn range_pool(&self) -> &BufferPool<String> {
        &self.ranges
    }

    /// Buffer `reader` under the size ceiling and extract its text.
    ///
    /// `declared_len` is the advertised length, if known.
    #[instrument(skip_all, fields(declared_len = ?declared_len))]
    pub fn extract<R: Read>(&self, reader: R, declared_len: Option<u64>) -> Result<String> {
        let data = self
            .size_guard()
            .read_from(reader, declared_len, &self.documents)?;
        Ok(self.extract_bytes(&data)?.text)
    }

    /// Parse already-buffered bytes and extract their text.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<Extraction> {
        let document = self.parser.parse(bytes)?;
        self.extract_document(&document)
    }

    /// Extract every page of a parsed document, in page order.
    pub fn extract_document(&self, document: &Document) -> Result<Extraction> {
        let page_count = document.page_count();
        let ranges = plan_ranges(page_count, self.parallelism(), self.config.worker_ceiling());
        if ranges.is_empty() {
            return Ok(Extraction {
                text: String::new(),
                page_count,
            });
        }

        info!(pages = page_count, workers = ranges.len(), "extracting PDF text");
        let thresholds = self.config.thresholds();

        let mut slots: Vec<Option<Pooled<'_, String>>> = ranges.iter().map(|_| None).collect();
        rayon::scope(|scope| {
            for (slot, range) in slots.iter_mut().zip(&ranges) {
                scope.spawn(move |_| {
                    *slot = Some(self.render_range(document, *range, &thresholds));
                });
            }
        });

        if self.is_cancelled() {
            debug!("extraction cancelled");
            return Err(ExtractError::Cancelled);
        }

        let text = assemble(slots.into_iter().flatten());
        debug!(bytes = text.len(), "assembled document");
        Ok(Extraction { text, page_count })
    }

    /// Worker body: render one page range into its own pooled buffer.
    fn render_range(
        &self,
        document: &Document,
        range: PageRange,
        thresholds: &Thresholds,
    ) -> Pooled<'_, String> {
        trace!(start = range.start, end = range.end_exclusive, "worker started");
        let mut buf = self.ranges.acquire();

        for number in range.pages() {
            if self.is_cancelled() {
                break;
            }
            if number > range.start {
                buf.push_str(PAGE_SEPARATOR);
            }
            // Writing to a String cannot fail.
            let _ = write!(buf, "## Page {number}\n\n");

            match document.page(number) {
                Some(page) => reconstruct_into(&page.fragments, thresholds, &mut buf),
                None => {
                    debug!(page = number, "page not found");
                    buf.push_str(PAGE_NOT_FOUND_MARKER);
                }
            }
        }

        buf
    }

    fn parallelism(&self) -> usize {
        self.config
            .parallelism
            .unwrap_or_else(rayon::current_num_threads)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Join range buffers in worker order, returning each buffer to its pool.
///
/// Empty buffers contribute nothing, not even a separator.
pub fn assemble<'a>(buffers: impl IntoIterator<Item = Pooled<'a, String>>) -> String {
    let buffers: Vec<_> = buffers.into_iter().collect();
    let capacity = buffers.iter().map(|b| b.len() + PAGE_SEPARATOR.len()).sum::<usize>();
    let mut out = String::with_capacity(capacity);

    for buf in buffers {
        if buf.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str(PAGE_SEPARATOR);
        }
        out.push_str(&buf);
    }

    out
}

/// Checks if the content type indicates PDF content.
#[must_use]
pub fn is_pdf_content_type(content_type: &str) -> bool {
    content_type.to_lowercase().contains("application/pdf")
}

/// Converts PDF responses to page-delimited markdown.
pub struct PdfHandler {
    extractor: PdfExtractor,
}

impl PdfHandler {
    pub fn new(extractor: PdfExtractor) -> Self {
        Self { extractor }
    }

    /// Handler backed by pdfium, the bundled container parser.
    #[cfg(feature = "pdf")]
    pub fn pdfium(config: ExtractConfig) -> Self {
        Self::new(PdfExtractor::new(Arc::new(super::pdfium::PdfiumParser)).with_config(config))
    }
}

impl ContentHandler for PdfHandler {
    fn supported_types(&self) -> &[&str] {
        &["application/pdf"]
    }

    fn accepts(&self, content_type: &str) -> bool {
        is_pdf_content_type(content_type)
    }

    fn to_markdown(
        &self,
        bytes: &[u8],
        content_type: &str,
        _source: Option<&Url>,
    ) -> AnyResult<ConversionResult> {
        let start = std::time::Instant::now();

        self.extractor
            .size_guard()
            .check_declared(Some(bytes.len() as u64))?;
        let extraction = self.extractor.extract_bytes(bytes)?;

        Ok(ConversionResult {
            markdown: extraction.text,
            page_count: Some(extraction.page_count),
            content_type: content_type.to_string(),
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}
