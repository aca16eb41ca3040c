//! Page text reconstruction from positioned fragments.
//!
//! PDF text runs carry no explicit whitespace. Word and line boundaries are
//! inferred purely from geometry:
//!
//! 1. A vertical jump larger than [`Thresholds::line_break`] starts a new line.
//! 2. On the same line, a horizontal gap after the previous run's right edge
//!    larger than `max(min_word_gap, font_size * word_gap_ratio)` is a space.
//! 3. Anything closer is a continuation of the same word.
//!
//! Fragments are consumed in container order. Nothing is re-sorted, so a
//! line's runs must arrive before the next line's runs.

use super::types::TextFragment;

/// Inline marker written in place of a page the container could not resolve.
pub const PAGE_NOT_FOUND_MARKER: &str = "[Error: page not found]\n";

/// Geometric thresholds for word and line inference, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum |Δy| between runs that counts as a new line.
    pub line_break: f32,
    /// Fraction of the previous run's font size that counts as a word gap.
    pub word_gap_ratio: f32,
    /// Floor for the word gap threshold.
    pub min_word_gap: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            line_break: 1.0,
            word_gap_ratio: 0.2,
            min_word_gap: 1.0,
        }
    }
}

impl Thresholds {
    /// Gap needed after `prev` before the next run is treated as a new word.
    #[must_use]
    pub fn word_gap(&self, prev: &TextFragment) -> f32 {
        (prev.font_size * self.word_gap_ratio).max(self.min_word_gap)
    }
}

/// Append the reconstructed text of one page to `out`.
///
/// An empty fragment list appends nothing.
pub fn reconstruct_into(fragments: &[TextFragment], thresholds: &Thresholds, out: &mut String) {
    let mut last: Option<&TextFragment> = None;

    for frag in fragments.iter().filter(|f| !f.text.is_empty()) {
        if let Some(prev) = last {
            if (frag.y - prev.y).abs() > thresholds.line_break {
                out.push('\n');
            } else if frag.x - prev.end_x() > thresholds.word_gap(prev) {
                out.push(' ');
            }
        }
        out.push_str(&frag.text);
        last = Some(frag);
    }
}

/// Reconstruct the text of one page into a fresh string.
#[must_use]
pub fn reconstruct_page(fragments: &[TextFragment], thresholds: &Thresholds) -> String {
    let mut out = String::new();
    reconstruct_into(fragments, thresholds, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f32, y: f32, width: f32) -> TextFragment {
        TextFragment::new(text, x, y, width, 12.0)
    }

    fn run(fragments: &[TextFragment]) -> String {
        reconstruct_page(fragments, &Thresholds::default())
    }

    #[test]
    fn empty_page_yields_empty_string() {
        assert_eq!(run(&[]), "");
    }

    #[test]
    fn single_fragment_is_verbatim() {
        assert_eq!(run(&[frag("Hello", 10.0, 700.0, 30.0)]), "Hello");
    }

    #[test]
    fn wide_gap_inserts_space() {
        // 12pt font → threshold 2.4; gap is 5.0
        let frags = [frag("Hello", 10.0, 700.0, 30.0), frag("World", 45.0, 700.0, 32.0)];
        assert_eq!(run(&frags), "Hello World");
    }

    #[test]
    fn narrow_gap_joins_directly() {
        // gap of 2.0 is under the 2.4 threshold
        let frags = [frag("Hel", 10.0, 700.0, 18.0), frag("lo", 30.0, 700.0, 12.0)];
        assert_eq!(run(&frags), "Hello");
    }

    #[test]
    fn gap_exactly_at_threshold_joins_directly() {
        let thresholds = Thresholds::default();
        let prev = TextFragment::new("ab", 0.0, 0.0, 10.0, 10.0);
        // threshold = max(1.0, 2.0) = 2.0
        let next = TextFragment::new("cd", 12.0, 0.0, 10.0, 10.0);
        assert_eq!(reconstruct_page(&[prev, next], &thresholds), "abcd");
    }

    #[test]
    fn small_font_uses_threshold_floor() {
        // 3pt font → 0.6, floored to 1.0. A gap of 0.8 stays joined, 1.5 splits.
        let joined = [
            TextFragment::new("a", 0.0, 0.0, 2.0, 3.0),
            TextFragment::new("b", 2.8, 0.0, 2.0, 3.0),
        ];
        let split = [
            TextFragment::new("a", 0.0, 0.0, 2.0, 3.0),
            TextFragment::new("b", 3.5, 0.0, 2.0, 3.0),
        ];
        assert_eq!(run(&joined), "ab");
        assert_eq!(run(&split), "a b");
    }

    #[test]
    fn vertical_jump_inserts_newline_regardless_of_x() {
        let frags = [
            frag("First", 10.0, 700.0, 30.0),
            // Directly adjacent in x, but a line lower
            frag("Second", 40.0, 685.0, 36.0),
        ];
        assert_eq!(run(&frags), "First\nSecond");
    }

    #[test]
    fn small_vertical_jitter_stays_on_line() {
        let frags = [frag("Sub", 10.0, 700.0, 18.0), frag("script", 28.0, 699.2, 36.0)];
        assert_eq!(run(&frags), "Subscript");
    }

    #[test]
    fn empty_fragments_are_skipped_and_do_not_move_cursor() {
        let frags = [
            frag("", 0.0, 0.0, 0.0),
            frag("Hello", 10.0, 700.0, 30.0),
            // Would force a newline if it became the cursor
            frag("", 500.0, 100.0, 0.0),
            frag("there", 41.0, 700.0, 30.0),
        ];
        assert_eq!(run(&frags), "Hellothere");
    }

    #[test]
    fn custom_thresholds_are_honoured() {
        let loose = Thresholds {
            line_break: 20.0,
            word_gap_ratio: 0.2,
            min_word_gap: 50.0,
        };
        let frags = [frag("one", 0.0, 700.0, 18.0), frag("two", 40.0, 690.0, 18.0)];
        assert_eq!(reconstruct_page(&frags, &loose), "onetwo");
        assert_eq!(run(&frags), "one\ntwo");
    }

    #[test]
    fn appends_to_existing_buffer() {
        let mut out = String::from("## Page 1\n\n");
        reconstruct_into(&[frag("Body", 0.0, 0.0, 20.0)], &Thresholds::default(), &mut out);
        assert_eq!(out, "## Page 1\n\nBody");
    }
}
