//! Document rendering: title + bullets → paginated PDF bytes.
//!
//! ## Stages
//!
//! 1. **Re-clean** every candidate with the leading-marker rule, collapse its
//!    whitespace and drop the ones left empty. Candidates may come straight
//!    from a fallback path and were never normalised; duplicates are kept.
//! 2. **Check** every character against the embedded DejaVu Sans fonts. A
//!    character with no glyph fails the render unless a replacement is
//!    configured.
//! 3. **Lay out** with `genpdf`: a centred bold title, then an unordered list
//!    with one padded paragraph per bullet. Wrapping and page breaks are
//!    genpdf's.

use crate::config::DocumentStyle;
use crate::error::RenderError;
use crate::pipeline::rules;
use genpdf::elements::{Paragraph, UnorderedList};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::Style;
use genpdf::{Alignment, Document, Element as _, Margins, Mm, SimplePageDecorator, Size};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::debug;

static REGULAR_FONT: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/fonts/DejaVuSans.ttf"
));
static BOLD_FONT: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/fonts/DejaVuSans-Bold.ttf"
));

/// A page object in the serialised output (not the `/Pages` tree node).
static RE_PAGE_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/Type\s*/Page(?-u:\b)").unwrap());

const MM_PER_PT: f64 = 25.4 / 72.0;

fn mm(pt: f32) -> Mm {
    Mm::from(f64::from(pt) * MM_PER_PT)
}

/// A complete PDF document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    bytes: Vec<u8>,
    pages: usize,
}

impl RenderedDocument {
    /// Suggested download name.
    pub const FILE_NAME: &'static str = "summary.pdf";
    pub const MIME_TYPE: &'static str = "application/pdf";

    fn from_bytes(bytes: Vec<u8>) -> Self {
        let pages = RE_PAGE_OBJECT.find_iter(&bytes).count();
        Self { bytes, pages }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }
}

impl AsRef<[u8]> for RenderedDocument {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Strip one leading marker, collapse whitespace; drop what ends up empty.
///
/// Order is kept and duplicates are not removed.
pub fn clean_bullets<S: AsRef<str>>(bullets: &[S]) -> Vec<String> {
    bullets
        .iter()
        .map(|b| rules::collapse_whitespace(rules::strip_leading_marker(b.as_ref())))
        .filter(|b| !b.is_empty())
        .collect()
}

/// Title and bullet blocks exactly as they will be laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument {
    pub title: String,
    pub blocks: Vec<String>,
}

/// Renders titled bullet lists with a fixed [`DocumentStyle`].
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    style: DocumentStyle,
}

impl DocumentRenderer {
    pub fn new(style: DocumentStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &DocumentStyle {
        &self.style
    }

    /// Re-clean the candidates and check them against the fonts, without
    /// laying anything out.
    pub fn prepare<S: AsRef<str>>(
        &self,
        title: &str,
        bullets: &[S],
    ) -> Result<PreparedDocument, RenderError> {
        let glyphs = GlyphCheck::load()?;
        let replacement = self.style.replacement;
        if let Some(c) = replacement {
            if !glyphs.regular(c) || !glyphs.bold(c) {
                return Err(RenderError::new(format!(
                    "replacement {} has no glyph in the document font",
                    describe(c)
                )));
            }
        }
        if !glyphs.regular(self.style.bullet.glyph) {
            return Err(RenderError::new(format!(
                "bullet glyph {} has no glyph in the document font",
                describe(self.style.bullet.glyph)
            )));
        }

        let title = rules::collapse_whitespace(title);
        let title = substitute(&title, replacement, |c| glyphs.bold(c))
            .map_err(|c| RenderError::new(format!("{} in the title cannot be rendered", describe(c))))?;

        let cleaned = clean_bullets(bullets);
        debug!(
            "Rendering {} of {} candidate bullets",
            cleaned.len(),
            bullets.len()
        );
        let blocks = cleaned
            .iter()
            .enumerate()
            .map(|(i, text)| {
                substitute(text, replacement, |c| glyphs.regular(c)).map_err(|c| {
                    RenderError::new(format!(
                        "{} in bullet {} cannot be rendered",
                        describe(c),
                        i + 1
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PreparedDocument { title, blocks })
    }

    /// Lay out and serialise to PDF.
    pub fn render<S: AsRef<str>>(
        &self,
        title: &str,
        bullets: &[S],
    ) -> Result<RenderedDocument, RenderError> {
        let prepared = self.prepare(title, bullets)?;
        let mut doc = self.document()?;
        let style = &self.style;

        if !prepared.title.is_empty() {
            doc.set_title(prepared.title.as_str());
            doc.push(
                Paragraph::new(prepared.title.as_str())
                    .aligned(Alignment::Center)
                    .styled(Style::new().bold().with_font_size(style.title.font_size))
                    .padded(Margins::trbl(
                        Mm::from(0.0),
                        Mm::from(0.0),
                        mm(style.title.space_after),
                        Mm::from(0.0),
                    )),
            );
        }

        let mut list = UnorderedList::with_bullet(style.bullet.glyph.to_string());
        for block in &prepared.blocks {
            list.push(Paragraph::new(block.as_str()).padded(Margins::trbl(
                mm(style.bullet.space_before),
                Mm::from(0.0),
                mm(style.bullet.space_after),
                Mm::from(0.0),
            )));
        }
        doc.push(list);

        let mut bytes = Vec::new();
        doc.render(&mut bytes)
            .map_err(|e| RenderError::new(format!("PDF layout failed: {e}")))?;
        let document = RenderedDocument::from_bytes(bytes);
        debug!(
            "Rendered {} pages, {} bytes",
            document.page_count(),
            document.len()
        );
        Ok(document)
    }

    /// An empty document with the page geometry and fonts applied.
    fn document(&self) -> Result<Document, RenderError> {
        let style = &self.style;
        let regular = FontData::new(REGULAR_FONT.to_vec(), None)
            .map_err(|e| RenderError::new(format!("Failed to load DejaVuSans font: {e}")))?;
        let bold = FontData::new(BOLD_FONT.to_vec(), None)
            .map_err(|e| RenderError::new(format!("Failed to load DejaVuSans-Bold font: {e}")))?;

        let mut doc = Document::new(FontFamily {
            italic: regular.clone(),
            bold_italic: bold.clone(),
            regular,
            bold,
        });
        doc.set_minimal_conformance();
        doc.set_paper_size(Size::new(
            mm(style.page_size.width),
            mm(style.page_size.height),
        ));
        doc.set_font_size(style.bullet.font_size);
        doc.set_line_spacing(f64::from(style.bullet.line_spacing));

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(Margins::trbl(
            mm(style.margins.top),
            mm(style.margins.right),
            mm(style.margins.bottom),
            mm(style.margins.left),
        ));
        doc.set_page_decorator(decorator);
        Ok(doc)
    }
}

/// Glyph lookups in the embedded fonts.
struct GlyphCheck {
    regular: rusttype::Font<'static>,
    bold: rusttype::Font<'static>,
}

impl GlyphCheck {
    fn load() -> Result<Self, RenderError> {
        let load = |bytes: &'static [u8], name: &str| {
            rusttype::Font::try_from_bytes(bytes)
                .ok_or_else(|| RenderError::new(format!("Failed to parse {name} font")))
        };
        Ok(Self {
            regular: load(REGULAR_FONT, "DejaVuSans")?,
            bold: load(BOLD_FONT, "DejaVuSans-Bold")?,
        })
    }

    fn regular(&self, c: char) -> bool {
        has_glyph(&self.regular, c)
    }

    fn bold(&self, c: char) -> bool {
        has_glyph(&self.bold, c)
    }
}

/// Glyph 0 is `.notdef`: what the font draws for characters it lacks.
fn has_glyph(font: &rusttype::Font<'_>, c: char) -> bool {
    !c.is_control() && font.glyph(c).id().0 != 0
}

/// Replace characters `covered` rejects, or report the first one.
fn substitute(
    text: &str,
    replacement: Option<char>,
    covered: impl Fn(char) -> bool,
) -> Result<String, char> {
    text.chars()
        .map(|c| match (covered(c), replacement) {
            (true, _) => Ok(c),
            (false, Some(r)) => Ok(r),
            (false, None) => Err(c),
        })
        .collect()
}

fn describe(c: char) -> String {
    if c.is_control() {
        format!("control character U+{:04X}", c as u32)
    } else {
        format!("character '{}' (U+{:04X})", c, c as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_drops_empties_keeps_duplicates() {
        let cleaned = clean_bullets(&["", "  ", "- Keep this", "Keep this", "•"]);
        assert_eq!(cleaned, vec!["Keep this", "Keep this"]);
    }

    #[test]
    fn clean_strips_numeric_markers() {
        assert_eq!(clean_bullets(&["1. One", "2) Two"]), vec!["One", "Two"]);
    }

    #[test]
    fn clean_flattens_inner_line_breaks() {
        assert_eq!(clean_bullets(&["Split\nacross\tlines"]), vec!["Split across lines"]);
    }

    #[test]
    fn prepare_keeps_single_visible_block() {
        let prepared = DocumentRenderer::default()
            .prepare("Bullet Summary", &["", "  ", "Keep this"])
            .unwrap();
        assert_eq!(prepared.title, "Bullet Summary");
        assert_eq!(prepared.blocks, vec!["Keep this"]);
    }

    #[test]
    fn output_is_a_pdf() {
        let doc = DocumentRenderer::default()
            .render("Bullet Summary", &["One", "Two"])
            .unwrap();
        assert!(doc.as_bytes().starts_with(b"%PDF-"));
        assert_eq!(doc.page_count(), 1);
        assert_eq!(RenderedDocument::FILE_NAME, "summary.pdf");
        assert_eq!(RenderedDocument::MIME_TYPE, "application/pdf");
    }

    #[test]
    fn latin_and_symbols_render() {
        let prepared = DocumentRenderer::default()
            .prepare("Résumé", &["Revenue → up", "Æble, Øl, ©2024", "Latency ≤ 20 ms"])
            .unwrap();
        assert_eq!(prepared.blocks.len(), 3);
    }

    #[test]
    fn missing_glyph_fails() {
        let err = DocumentRenderer::default()
            .render("Summary", &["ok", "Launch 🚀 today"])
            .unwrap_err();
        assert!(err.reason.contains("U+1F680"), "got: {err}");
        assert!(err.reason.contains("bullet 2"), "got: {err}");
    }

    #[test]
    fn missing_title_glyph_fails() {
        let err = DocumentRenderer::default()
            .render("Summary 📄", &["ok"])
            .unwrap_err();
        assert!(err.reason.contains("title"), "got: {err}");
    }

    #[test]
    fn control_character_fails() {
        let err = DocumentRenderer::default()
            .render("Summary", &["bad\u{7}bell"])
            .unwrap_err();
        assert!(err.reason.contains("control character U+0007"), "got: {err}");
    }

    #[test]
    fn replacement_substitutes() {
        let style = DocumentStyle {
            replacement: Some('?'),
            ..DocumentStyle::default()
        };
        let prepared = DocumentRenderer::new(style)
            .prepare("Summary", &["Launch 🚀 today"])
            .unwrap();
        assert_eq!(prepared.blocks, vec!["Launch ? today"]);
    }

    #[test]
    fn unrenderable_replacement_rejected() {
        let style = DocumentStyle {
            replacement: Some('🚀'),
            ..DocumentStyle::default()
        };
        assert!(DocumentRenderer::new(style).render("T", &["x"]).is_err());
    }

    #[test]
    fn counts_page_objects_only() {
        let doc = RenderedDocument::from_bytes(
            b"<</Type/Pages/Count 2>> <</Type /Page>> <</Type/Page/Parent 2 0 R>>".to_vec(),
        );
        assert_eq!(doc.page_count(), 2);
    }
}
