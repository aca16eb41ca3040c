//! Container parser backed by `pdfium-render` (Chromium's PDF library).
//!
//! Each text segment pdfium reports becomes one [`TextFragment`], in the
//! order pdfium emits them. Font size is approximated by segment height.
//!
//! pdfium handles are not `Send`, so every page is read up front into an
//! owned [`Document`] before any worker starts.

use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::error::{ExtractError, Result};
use super::pdf::DocumentParser;
use super::types::{Document, Page, TextFragment};

/// Parses PDFs with a system or working-directory pdfium library.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumParser;

impl PdfiumParser {
    fn bind() -> Result<Pdfium> {
        let bindings = Pdfium::bind_to_system_library()
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            })
            .map_err(|e| ExtractError::Unsupported(format!("pdfium library not found: {e}")))?;
        Ok(Pdfium::new(bindings))
    }
}

impl DocumentParser for PdfiumParser {
    fn parse(&self, bytes: &[u8]) -> Result<Document> {
        let pdfium = Self::bind()?;
        let doc = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| ExtractError::ContainerParse(e.to_string()))?;

        let count = doc.pages().len();
        let mut pages = Vec::with_capacity(usize::from(count));

        for index in 0..count {
            let number = usize::from(index) + 1;
            let page = match doc.pages().get(index) {
                Ok(page) => page,
                Err(e) => {
                    warn!(page = number, error = %e, "page lookup failed");
                    pages.push(None);
                    continue;
                }
            };

            match page_fragments(&page) {
                Ok(fragments) => pages.push(Some(Page::new(number, fragments))),
                Err(e) => {
                    warn!(page = number, error = %e, "page text unavailable");
                    pages.push(None);
                }
            }
        }

        debug!(pages = pages.len(), "parsed PDF container");
        Ok(Document::new(pages))
    }
}

fn page_fragments(page: &PdfPage) -> std::result::Result<Vec<TextFragment>, PdfiumError> {
    let text = page.text()?;
    let fragments = text
        .segments()
        .iter()
        .map(|segment| {
            let bounds = segment.bounds();
            let left = bounds.left().value;
            let bottom = bounds.bottom().value;
            TextFragment::new(
                segment.text(),
                left,
                bottom,
                (bounds.right().value - left).abs(),
                (bounds.top().value - bottom).abs(),
            )
        })
        .collect();
    Ok(fragments)
}
