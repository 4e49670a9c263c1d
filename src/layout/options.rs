//! Layout reconstruction options.

/// Tuning thresholds for layout reconstruction.
///
/// The numeric defaults are empirically tuned values carried over from
/// the recognition pipeline; they are exposed as named fields so callers
/// can adjust them per corpus instead of re-deriving them.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Minimum element confidence; lower-confidence elements are dropped
    pub confidence_threshold: f32,

    /// Line grouping: multiple of average element height an element may
    /// deviate vertically from the running line and still join it
    pub line_height_factor: f32,

    /// Paragraph grouping: absolute vertical gap (pixels) that still
    /// keeps two lines in the same paragraph
    pub paragraph_gap_px: f32,

    /// Paragraph grouping: multiple of average line height used as the
    /// gap threshold when it exceeds `paragraph_gap_px`
    pub paragraph_gap_factor: f32,

    /// Fraction of page height counted as the top "header zone"
    pub header_zone_ratio: f32,

    /// Maximum word count for a paragraph to qualify as a heading
    pub heading_max_words: usize,

    /// Multiple of average page text height above which a paragraph
    /// counts as "larger than surrounding text"
    pub heading_height_factor: f32,

    /// Minimum number of double-space-separated words for the column
    /// heuristic to classify a paragraph as a table row
    pub column_min_words: usize,
}

impl LayoutOptions {
    /// Create options with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence threshold.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the line grouping height factor.
    pub fn with_line_height_factor(mut self, factor: f32) -> Self {
        self.line_height_factor = factor;
        self
    }

    /// Set the absolute paragraph gap in pixels.
    pub fn with_paragraph_gap(mut self, px: f32) -> Self {
        self.paragraph_gap_px = px;
        self
    }

    /// Set the header zone as a fraction of page height.
    pub fn with_header_zone_ratio(mut self, ratio: f32) -> Self {
        self.header_zone_ratio = ratio;
        self
    }

    /// Set the maximum heading word count.
    pub fn with_heading_max_words(mut self, words: usize) -> Self {
        self.heading_max_words = words;
        self
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            line_height_factor: 1.5,
            paragraph_gap_px: 40.0,
            paragraph_gap_factor: 2.5,
            header_zone_ratio: 0.15,
            heading_max_words: 5,
            heading_height_factor: 1.2,
            column_min_words: 4,
        }
    }
}
