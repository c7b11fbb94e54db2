//! Paginated PDF rendering target.
//!
//! Lays text out against a descending y-cursor in millimetres, with the
//! builtin Helvetica pair for the plain/bold weight distinction. The
//! PDF target collapses italic, underline and link syntax to plain
//! text; the grammar's only weight switch here is bold.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, IndirectFontRef, Line as PdfLine, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};
use thiserror::Error;
use tracing::debug;
use unicode_width::UnicodeWidthChar;

use crate::markup::{Line, LineKind, MarkupDocument};

/// Point-to-millimetre conversion for font sizes.
const PT_TO_MM: f32 = 0.352_778;

/// Errors from PDF layout and generation. All are fatal to the export
/// operation in progress; the caller surfaces the failure and may retry.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A character with no measurable advance width reached layout.
    #[error("glyph {ch:?} cannot be measured for layout")]
    Unmeasurable { ch: char },
    #[error("pdf backend error: {0}")]
    Pdf(#[from] printpdf::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Page geometry and line spacing. Defaults to A4 with a 20mm margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageStyle {
    pub width: Mm,
    pub height: Mm,
    pub margin: Mm,
    pub line_height: Mm,
}

impl Default for PageStyle {
    fn default() -> Self {
        Self {
            width: Mm(210.0),
            height: Mm(297.0),
            margin: Mm(20.0),
            line_height: Mm(6.0),
        }
    }
}

impl PageStyle {
    /// Usable width between the margins.
    pub fn content_width(&self) -> Mm {
        Mm(self.width.0 - 2.0 * self.margin.0)
    }

    /// x position of the right margin.
    pub fn right_edge(&self) -> Mm {
        Mm(self.width.0 - self.margin.0)
    }
}

/// The regular/bold builtin font pair used by every export.
pub struct PdfFonts {
    pub regular: IndirectFontRef,
    pub bold: IndirectFontRef,
}

/// Approximate advance-width model for the builtin Helvetica weights.
///
/// Width is display cells (unicode-width) times an em factor; the
/// builtin fonts carry no embedded metrics, and a proportional estimate
/// is enough for word-wrap decisions at clinical-note line lengths.
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    em: f32,
}

impl FontMetrics {
    pub const fn regular() -> Self {
        Self { em: 0.52 }
    }

    pub const fn bold() -> Self {
        Self { em: 0.56 }
    }

    const fn for_weight(bold: bool) -> Self {
        if bold { Self::bold() } else { Self::regular() }
    }

    /// Measured width of `text` at `size_pt`.
    ///
    /// # Errors
    /// [`RenderError::Unmeasurable`] if a zero-width control character
    /// reaches layout; valid note text never does.
    #[allow(clippy::cast_precision_loss)]
    pub fn width(&self, text: &str, size_pt: f32) -> Result<Mm, RenderError> {
        let mut cells = 0usize;
        for ch in text.chars() {
            cells += ch.width().ok_or(RenderError::Unmeasurable { ch })?;
        }
        Ok(Mm(cells as f32 * self.em * size_pt * PT_TO_MM))
    }
}

/// A run of text at one font weight, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
}

impl TextRun {
    pub const fn new(text: String, bold: bool) -> Self {
        Self { text, bold }
    }

    fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// Flatten a markup line to its PDF representation: ordered
/// `{text, bold}` runs with all non-bold marker semantics stripped.
/// Adjacent runs of the same weight merge. Tabs become spaces; the
/// builtin fonts have no tab glyph and tab stops carry no meaning in
/// proportional layout.
pub fn text_runs(line: &Line) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = Vec::new();
    for segment in line.segments() {
        push_run(
            &mut runs,
            TextRun::new(segment.text().replace('\t', " "), segment.style().bold),
        );
    }
    runs
}

fn push_run(runs: &mut Vec<TextRun>, run: TextRun) {
    if run.text.is_empty() {
        return;
    }
    if let Some(last) = runs.last_mut()
        && last.bold == run.bold
    {
        last.text.push_str(&run.text);
        return;
    }
    runs.push(run);
}

/// Owns the document under construction: current page layer, descending
/// y position, and page-break bookkeeping.
pub struct PageCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    style: PageStyle,
    y: Mm,
    pages: usize,
}

impl PageCursor {
    /// Start a new document with an empty first page.
    ///
    /// # Errors
    /// [`RenderError::Pdf`] if the builtin fonts cannot be registered.
    pub fn new(title: &str, style: PageStyle) -> Result<(Self, PdfFonts), RenderError> {
        let (doc, page, layer) = PdfDocument::new(title, style.width, style.height, "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let fonts = PdfFonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
        };
        let y = Mm(style.height.0 - style.margin.0);
        Ok((
            Self {
                doc,
                layer,
                style,
                y,
                pages: 1,
            },
            fonts,
        ))
    }

    pub const fn style(&self) -> PageStyle {
        self.style
    }

    /// Current vertical position (descending from the top of the page).
    pub const fn y(&self) -> Mm {
        self.y
    }

    pub const fn set_y(&mut self, y: Mm) {
        self.y = y;
    }

    /// Number of pages emitted so far.
    pub const fn page_count(&self) -> usize {
        self.pages
    }

    /// Move the cursor down one line.
    pub fn advance(&mut self) {
        self.y -= self.style.line_height;
    }

    /// Move the cursor down an arbitrary amount.
    pub fn advance_by(&mut self, dy: Mm) {
        self.y -= dy;
    }

    /// Break to a fresh page if `needed` vertical space would cross the
    /// bottom margin. Returns whether a page break happened.
    pub fn ensure_room(&mut self, needed: Mm) -> bool {
        if self.y.0 - needed.0 >= self.style.margin.0 {
            return false;
        }
        let (page, layer) =
            self.doc
                .add_page(self.style.width, self.style.height, "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = Mm(self.style.height.0 - self.style.margin.0);
        self.pages += 1;
        debug!(page = self.pages, "page break");
        true
    }

    /// Place text at `x` on the current baseline without advancing.
    pub fn text(&self, text: &str, size_pt: f32, x: Mm, font: &IndirectFontRef) {
        self.layer.use_text(text, size_pt, x, self.y, font);
    }

    /// Place text at an explicit position on the current page,
    /// independent of the cursor. Used for footers.
    pub fn text_at(&self, text: &str, size_pt: f32, x: Mm, y: Mm, font: &IndirectFontRef) {
        self.layer.use_text(text, size_pt, x, y, font);
    }

    /// Draw a horizontal rule across `[x1, x2]` at the current baseline.
    pub fn rule(&self, x1: Mm, x2: Mm) {
        self.layer.set_outline_thickness(0.4);
        self.layer.add_line(PdfLine {
            points: vec![
                (Point::new(x1, self.y), false),
                (Point::new(x2, self.y), false),
            ],
            is_closed: false,
        });
    }

    /// Finish the document and return the PDF bytes.
    ///
    /// # Errors
    /// [`RenderError::Pdf`] if serialization fails.
    pub fn into_bytes(self) -> Result<Vec<u8>, RenderError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc.save(&mut buf)?;
        Ok(buf.into_inner().map_err(std::io::IntoInnerError::into_error)?)
    }
}

/// Render a markup document as word-wrapped text starting at the
/// cursor's current position, left edge `x0`, wrapping at `max_width`.
///
/// Bold segments switch to the bold font for their duration; list lines
/// get their bullet or number re-attached. Returns the y position after
/// the last emitted line so callers can continue laying out below.
///
/// # Errors
/// [`RenderError::Unmeasurable`] on unmeasurable input; the export
/// operation must be abandoned.
pub fn render_markup(
    cursor: &mut PageCursor,
    fonts: &PdfFonts,
    doc: &MarkupDocument,
    x0: Mm,
    max_width: Mm,
    size_pt: f32,
) -> Result<Mm, RenderError> {
    let line_height = cursor.style().line_height;

    for line in doc.lines() {
        if line.kind() == LineKind::Empty {
            cursor.ensure_room(line_height);
            cursor.advance();
            continue;
        }

        let mut runs = Vec::new();
        match line.kind() {
            LineKind::Bullet => runs.push(TextRun::new("\u{2022} ".to_string(), false)),
            LineKind::Numbered(n) => runs.push(TextRun::new(format!("{n}. "), false)),
            LineKind::Paragraph | LineKind::Empty => {}
        }
        runs.extend(text_runs(line));

        for wrapped in wrap_runs(&runs, max_width, size_pt)? {
            cursor.ensure_room(line_height);
            let mut x = x0;
            for run in wrapped {
                let width = FontMetrics::for_weight(run.bold).width(&run.text, size_pt)?;
                let font = if run.bold { &fonts.bold } else { &fonts.regular };
                cursor.text(&run.text, size_pt, x, font);
                x = Mm(x.0 + width.0);
            }
            cursor.advance();
        }
    }

    debug!(y = cursor.y().0, "markup block rendered");
    Ok(cursor.y())
}

/// Parse-and-render convenience for stored markup fields.
///
/// # Errors
/// See [`render_markup`].
pub fn render_markup_str(
    cursor: &mut PageCursor,
    fonts: &PdfFonts,
    markup: &str,
    x0: Mm,
    max_width: Mm,
    size_pt: f32,
) -> Result<Mm, RenderError> {
    render_markup(
        cursor,
        fonts,
        &MarkupDocument::parse(markup),
        x0,
        max_width,
        size_pt,
    )
}

/// Word-wrap weight-tagged runs against `max_width` at `size_pt`.
///
/// Tokens are maximal whitespace or non-whitespace chunks; a token that
/// would overflow moves whole to the next line, and leading whitespace
/// at a line start is dropped. Line order and left-to-right run order
/// are preserved exactly.
pub(crate) fn wrap_runs(
    runs: &[TextRun],
    max_width: Mm,
    size_pt: f32,
) -> Result<Vec<Vec<TextRun>>, RenderError> {
    let mut tokens: Vec<TextRun> = Vec::new();
    for run in runs {
        tokens.extend(split_tokens(run));
    }

    let mut lines: Vec<Vec<TextRun>> = Vec::new();
    let mut current: Vec<TextRun> = Vec::new();
    let mut width = 0.0f32;
    let mut has_word = false;

    for token in tokens {
        let token_width = FontMetrics::for_weight(token.bold)
            .width(&token.text, size_pt)?
            .0;
        let token_is_ws = token.is_whitespace();

        if width + token_width > max_width.0 && has_word {
            lines.push(std::mem::take(&mut current));
            width = 0.0;
            has_word = false;
        }

        if token_is_ws && !has_word {
            continue;
        }

        width += token_width;
        push_run(&mut current, token);
        if !token_is_ws {
            has_word = true;
        }
    }

    lines.push(current);
    Ok(lines)
}

/// Split a run into alternating whitespace / word tokens, keeping the
/// run's weight on every token.
fn split_tokens(run: &TextRun) -> Vec<TextRun> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut ws_state: Option<bool> = None;

    for ch in run.text.chars() {
        let is_ws = ch.is_whitespace();
        match ws_state {
            Some(state) if state == is_ws => buf.push(ch),
            Some(_) => {
                out.push(TextRun::new(std::mem::take(&mut buf), run.bold));
                buf.push(ch);
                ws_state = Some(is_ws);
            }
            None => {
                buf.push(ch);
                ws_state = Some(is_ws);
            }
        }
    }
    if !buf.is_empty() {
        out.push(TextRun::new(buf, run.bold));
    }
    out
}
