//! Shared types for the PDF extraction pipeline.
//!
//! The container parser produces a [`Document`]; the reconstructor and the
//! worker pool only ever read it. Kept separate from `pdf.rs` so the
//! reconstructor and scheduler don't depend on the parser seam.

/// A positioned run of text emitted by the container parser.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    /// Left edge in PDF points (1pt = 1/72 inch).
    pub x: f32,
    /// Baseline Y position (bottom-up coordinate system).
    pub y: f32,
    pub width: f32,
    /// Font size approximation (run height).
    pub font_size: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            font_size,
        }
    }

    /// X coordinate where an adjacent run on the same line would start.
    #[must_use]
    pub fn end_x(&self) -> f32 {
        self.x + self.width
    }
}

/// A single page: fragments in container order plus its 1-based number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub number: usize,
    pub fragments: Vec<TextFragment>,
}

impl Page {
    pub fn new(number: usize, fragments: Vec<TextFragment>) -> Self {
        Self { number, fragments }
    }
}

/// A parsed document.
///
/// Slot `i` holds page `i + 1`. A `None` slot means the container could not
/// resolve that page reference; extraction renders it as an inline marker
/// instead of failing.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pages: Vec<Option<Page>>,
}

impl Document {
    pub fn new(pages: Vec<Option<Page>>) -> Self {
        Self { pages }
    }

    /// Build a document where every page resolved.
    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self {
            pages: pages.into_iter().map(Some).collect(),
        }
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Look up a page by its 1-based number.
    #[must_use]
    pub fn page(&self, number: usize) -> Option<&Page> {
        number
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
            .and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_lookup_is_one_based() {
        let doc = Document::from_pages(vec![Page::new(1, vec![]), Page::new(2, vec![])]);
        assert_eq!(doc.page_count(), 2);
        assert!(doc.page(0).is_none());
        assert_eq!(doc.page(1).map(|p| p.number), Some(1));
        assert_eq!(doc.page(2).map(|p| p.number), Some(2));
        assert!(doc.page(3).is_none());
    }

    #[test]
    fn missing_slot_reports_no_page() {
        let doc = Document::new(vec![Some(Page::new(1, vec![])), None]);
        assert_eq!(doc.page_count(), 2);
        assert!(doc.page(2).is_none());
    }

    #[test]
    fn fragment_end_x() {
        let frag = TextFragment::new("Hi", 10.0, 100.0, 12.5, 12.0);
        assert!((frag.end_x() - 22.5).abs() < f32::EPSILON);
    }
}
