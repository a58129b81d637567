//! PDF painting of a laid-out report with `genpdf`.

use std::path::{Path, PathBuf};

use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Color, Style};
use genpdf::{Context, Document, Element, Mm, PaperSize, Position, RenderResult, render};
use tracing::debug;

use super::{Align, LineStyle, PAGE_HEIGHT, Page, REPORT_TITLE, ReportLayout, ReportRenderer};
use crate::config::ReportConfig;
use crate::error::ReportError;

const MM_PER_PT: f64 = 25.4 / 72.0;
// Ascender of the metric-compatible sans families as a fraction of the font size.
const ASCENT_RATIO: f64 = 0.718;

// File name suffixes tried for each face, e.g. `LiberationSans-Regular.ttf`
// or `DejaVuSans.ttf`.
const REGULAR_SUFFIXES: &[&str] = &["-Regular", "", "-Book"];
const BOLD_SUFFIXES: &[&str] = &["-Bold"];
const ITALIC_SUFFIXES: &[&str] = &["-Italic", "-Oblique"];
const BOLD_ITALIC_SUFFIXES: &[&str] = &["-BoldItalic", "-BoldOblique"];

fn pt_to_mm(pt: f64) -> Mm {
    Mm::from(pt * MM_PER_PT)
}

fn find_face(dir: &Path, family: &str, suffixes: &[&str]) -> Option<PathBuf> {
    suffixes
        .iter()
        .map(|suffix| dir.join(format!("{}{}.ttf", family, suffix)))
        .find(|path| path.is_file())
}

/// Load one family from `dir`. `Ok(None)` when the regular face is absent;
/// missing bold or italic faces fall back to the regular (or bold) one.
fn load_family_from(
    dir: &Path,
    family: &str,
) -> Result<Option<FontFamily<FontData>>, genpdf::error::Error> {
    let Some(regular_path) = find_face(dir, family, REGULAR_SUFFIXES) else {
        return Ok(None);
    };
    // No built-in stand-in: the TrueType data is embedded in the document.
    let regular = FontData::load(&regular_path, None)?;
    let face = |suffixes: &[&str], fallback: &FontData| match find_face(dir, family, suffixes) {
        Some(path) => FontData::load(&path, None),
        None => Ok(fallback.clone()),
    };
    let bold = face(BOLD_SUFFIXES, &regular)?;
    let italic = face(ITALIC_SUFFIXES, &regular)?;
    let bold_italic = face(BOLD_ITALIC_SUFFIXES, &bold)?;
    Ok(Some(FontFamily {
        regular,
        bold,
        italic,
        bold_italic,
    }))
}

/// Load the report font: the configured family first, then each fallback
/// family, from the first directory that has it.
///
/// The TrueType faces are embedded in the report, so any character the
/// font covers can be painted.
pub fn load_font_family(config: &ReportConfig) -> Result<FontFamily<FontData>, ReportError> {
    let families = std::iter::once(&config.font_family).chain(&config.fallback_families);
    for family in families {
        for dir in config.font_dirs.iter().filter(|dir| dir.is_dir()) {
            match load_family_from(dir, family) {
                Ok(Some(loaded)) => {
                    debug!(dir = %dir.display(), family = %family, "Loaded report font");
                    return Ok(loaded);
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(dir = %dir.display(), family = %family, error = %e, "Font family not usable here");
                }
            }
        }
    }
    Err(ReportError::FontNotFound {
        family: config.font_family.clone(),
        searched: config.font_dirs.clone(),
    })
}

/// Paint `layout` into an in-memory PDF document.
pub fn render_pdf(layout: &ReportLayout, config: &ReportConfig) -> Result<Vec<u8>, ReportError> {
    let family = load_font_family(config)?;
    let mut doc = Document::new(family);
    doc.set_title(REPORT_TITLE);
    doc.set_paper_size(PaperSize::Letter);
    doc.push(PlacedPages::new(layout.pages().to_vec()));

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(|e| ReportError::Render {
        message: e.to_string(),
    })?;
    debug!(
        pages = layout.page_count(),
        bytes = buffer.len(),
        "Rendered report PDF"
    );
    Ok(buffer)
}

/// The production renderer: letter-size PDF through `genpdf`.
#[derive(Debug, Clone)]
pub struct GenPdfRenderer {
    config: ReportConfig,
}

impl GenPdfRenderer {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Fail early when no report font can be found.
    pub fn check_fonts(&self) -> Result<(), ReportError> {
        load_font_family(&self.config).map(|_| ())
    }
}

impl ReportRenderer for GenPdfRenderer {
    fn render(&self, layout: &ReportLayout) -> Result<Vec<u8>, ReportError> {
        render_pdf(layout, &self.config)
    }
}

fn style_for(line: LineStyle) -> Style {
    let mut style = Style::new().with_font_size(line.font_size());
    if line.is_bold() {
        style = style.bold();
    }
    if line == LineStyle::Warning {
        style = style.with_color(Color::Rgb(255, 0, 0));
    }
    style
}

/// A genpdf element that draws one pre-laid-out page per render call and
/// asks for a fresh page while any remain.
struct PlacedPages {
    pages: Vec<Page>,
    next: usize,
}

impl PlacedPages {
    fn new(pages: Vec<Page>) -> Self {
        Self { pages, next: 0 }
    }
}

impl Element for PlacedPages {
    fn render(
        &mut self,
        context: &Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, genpdf::error::Error> {
        let mut result = RenderResult::default();
        let Some(page) = self.pages.get(self.next) else {
            return Ok(result);
        };

        for line in &page.lines {
            let style = style_for(line.style);
            let top = PAGE_HEIGHT - line.y - f64::from(line.style.font_size()) * ASCENT_RATIO;
            let left = match line.align {
                Align::Left => pt_to_mm(line.x),
                Align::Center => {
                    pt_to_mm(line.x) - style.str_width(&context.font_cache, &line.text) / 2.0
                }
            };
            area.print_str(
                &context.font_cache,
                Position::new(left, pt_to_mm(top)),
                style,
                &line.text,
            )?;
        }

        self.next += 1;
        result.size = area.size();
        result.has_more = self.next < self.pages.len();
        Ok(result)
    }
}
