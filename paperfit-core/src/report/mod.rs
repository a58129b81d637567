//! Report layout and rendering.
//!
//! Layout is a pure pass: `ReportLayout` owns the page list and the vertical
//! cursor and places every line of the report at a fixed position on a US
//! Letter page. A `ReportRenderer` then turns the layout into bytes:
//! `GenPdfRenderer` paints a PDF with `genpdf`, `PlainTextRenderer` dumps the
//! lines. Pagination is therefore testable without any fonts.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner; a
//! line's `y` is its baseline.

pub mod pdf;

use crate::analysis::Analysis;
use crate::error::ReportError;

pub use pdf::{GenPdfRenderer, load_font_family, render_pdf};

/// US Letter width in points.
pub const PAGE_WIDTH: f64 = 612.0;
/// US Letter height in points.
pub const PAGE_HEIGHT: f64 = 792.0;
/// Distance from the top edge to the first baseline.
pub const TOP_MARGIN: f64 = 40.0;
/// The cursor may not go below this before a new page starts.
pub const BOTTOM_MARGIN: f64 = 60.0;
/// Left edge of every left-aligned line.
pub const LEFT_MARGIN: f64 = 40.0;
/// Maximum characters per wrapped body line.
pub const WRAP_WIDTH: usize = 95;

pub const REPORT_TITLE: &str = "Research Paper Relevance Report";
pub const LOW_SCORE_WARNING: &str = "Warning: This paper may not be very relevant to your thesis.";
pub const SUMMARY_HEADING: &str = "Summary of the Paper";
pub const CITATIONS_HEADING: &str = "Suggested Citations";
pub const REVIEW_HEADING: &str = "Literature Review Paragraph";

const TITLE_GAP: f64 = 40.0;
const WARNING_GAP: f64 = 20.0;
const SECTION_GAP: f64 = 30.0;
const HEADING_GAP: f64 = 18.0;
const BODY_LEADING: f64 = 14.0;

/// Visual role of a placed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Score,
    Warning,
    Heading,
    Body,
}

impl LineStyle {
    pub fn font_size(self) -> u8 {
        match self {
            LineStyle::Title => 16,
            LineStyle::Score | LineStyle::Warning | LineStyle::Heading => 12,
            LineStyle::Body => 11,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, LineStyle::Title | LineStyle::Heading)
    }
}

/// Horizontal anchoring of a placed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// `x` is the left edge.
    Left,
    /// `x` is the horizontal centre.
    Center,
}

/// One line of text at a fixed position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub style: LineStyle,
    pub align: Align,
}

/// The lines placed on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

/// Renderer state: the pages laid out so far and the cursor on the last one.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    pages: Vec<Page>,
    cursor: f64,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportLayout {
    /// A single empty page with the cursor at the top margin.
    pub fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            cursor: PAGE_HEIGHT - TOP_MARGIN,
        }
    }

    /// Current baseline position on the last page.
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    /// Every placed line across all pages, in drawing order.
    pub fn lines(&self) -> impl Iterator<Item = &PlacedLine> {
        self.pages.iter().flat_map(|p| p.lines.iter())
    }

    /// Start a new page and reset the cursor to the top margin.
    pub fn page_break(&mut self) {
        self.pages.push(Page::default());
        self.cursor = PAGE_HEIGHT - TOP_MARGIN;
    }

    /// Move the cursor down by `dy`, breaking the page once it drops below
    /// the bottom margin.
    pub fn advance(&mut self, dy: f64) {
        self.cursor -= dy;
        if self.cursor < BOTTOM_MARGIN {
            self.page_break();
        }
    }

    /// Place `text` at the cursor without moving it.
    pub fn push_line(&mut self, text: impl Into<String>, style: LineStyle, align: Align) {
        let x = match align {
            Align::Left => LEFT_MARGIN,
            Align::Center => PAGE_WIDTH / 2.0,
        };
        let line = PlacedLine {
            text: text.into(),
            x,
            y: self.cursor,
            style,
            align,
        };
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(line);
        }
    }

    /// Drop the blank page left behind when the last advance crossed the
    /// bottom margin. The first page is always kept.
    pub fn finish(mut self) -> Self {
        if self.pages.len() > 1 && self.pages.last().is_some_and(|p| p.lines.is_empty()) {
            self.pages.pop();
        }
        self
    }

    /// Place a labelled section: a bold heading followed by `body`, wrapped.
    pub fn push_block(&mut self, heading: &str, body: &str) {
        self.advance(SECTION_GAP);
        self.push_line(heading, LineStyle::Heading, Align::Left);
        self.advance(HEADING_GAP);
        for raw in body.split('\n') {
            for part in wrap_text(raw, WRAP_WIDTH) {
                self.push_line(part, LineStyle::Body, Align::Left);
                self.advance(BODY_LEADING);
            }
        }
    }
}

/// Turns a finished layout into the downloadable document bytes.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, layout: &ReportLayout) -> Result<Vec<u8>, ReportError>;

    /// MIME type of the rendered bytes.
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}

/// Renders the layout as plain text, one line per placed line and a form feed
/// between pages. For tests and hosts without the report fonts.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextRenderer;

impl ReportRenderer for PlainTextRenderer {
    fn render(&self, layout: &ReportLayout) -> Result<Vec<u8>, ReportError> {
        let pages: Vec<String> = layout
            .pages()
            .iter()
            .map(|page| {
                page.lines
                    .iter()
                    .map(|l| l.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect();
        Ok(pages.join("\n\x0c\n").into_bytes())
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }
}

/// Lay out the full report for `analysis`.
pub fn layout_report(analysis: &Analysis) -> ReportLayout {
    let mut layout = ReportLayout::new();

    layout.push_line(REPORT_TITLE, LineStyle::Title, Align::Center);
    layout.advance(TITLE_GAP);
    layout.push_line(
        format!("Relevance Score: {:.2}", analysis.score),
        LineStyle::Score,
        Align::Left,
    );

    if analysis.low_score {
        layout.advance(WARNING_GAP);
        layout.push_line(LOW_SCORE_WARNING, LineStyle::Warning, Align::Left);
    }

    layout.push_block(SUMMARY_HEADING, &analysis.summary);
    layout.push_block(CITATIONS_HEADING, &numbered_list(&analysis.citations));
    layout.push_block(REVIEW_HEADING, &analysis.review);
    layout.finish()
}

/// `1. first\n2. second ...`
pub fn numbered_list(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap one line of text into chunks of at most `width` characters.
///
/// Runs of whitespace collapse to single spaces and control characters are
/// dropped. Words are packed greedily; a word longer than `width` is split
/// across chunks. Blank input yields no chunks.
pub fn wrap_text(line: &str, width: usize) -> Vec<String> {
    // textwrap is built without `unicode-width`, so it measures in chars.
    let normalized = line
        .split_whitespace()
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if normalized.is_empty() {
        return Vec::new();
    }
    let options = textwrap::Options::new(width.max(1))
        .wrap_algorithm(textwrap::WrapAlgorithm::FirstFit)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
        .break_words(true);
    textwrap::wrap(&normalized, options)
        .into_iter()
        .map(|chunk| chunk.into_owned())
        .collect()
}
