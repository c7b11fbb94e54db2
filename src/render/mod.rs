//! Rendering targets for stored markup.
//!
//! Both targets consume the same parsed grammar and agree on its
//! semantics; they never call each other. The HTML target produces a
//! sanitized fragment for on-screen display, the PDF target a
//! word-wrapped, paginated text layout for document export.

pub mod html;
pub mod pdf;

pub use html::{escape_html, render_html, render_html_str};
pub use pdf::{
    FontMetrics, PageCursor, PageStyle, PdfFonts, RenderError, TextRun, render_markup,
    render_markup_str, text_runs,
};
