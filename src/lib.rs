// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference
    clippy::module_name_repetitions
)]

//! # Clinmark
//!
//! Clinical note markup: a fixed six-construct inline grammar
//! (`**bold**`, `*italic*`, `<u>underline</u>`, bullet and numbered
//! list lines, `[label](url)` links) with one encoder and two
//! independent rendering targets.
//!
//! Notes are authored in a plain-text editing surface; the encoder
//! wraps selections in marker pairs and the resulting string is stored
//! verbatim on the parent clinical record. On read-back the same string
//! is rendered either as a sanitized HTML fragment (screen) or as
//! word-wrapped, paginated PDF text (document export). Both targets
//! parse through the same single-pass scanner, so they always agree on
//! the grammar's semantics.
//!
//! ## Modules
//!
//! - [`markup`]: grammar types, scanner, and the selection encoder
//! - [`render`]: the HTML and PDF rendering targets
//! - [`records`]: typed clinical records with boundary validation
//! - [`export`]: one-shot prescription / invoice / consultation PDFs
//! - [`config`]: saved CLI defaults

pub mod config;
pub mod export;
pub mod markup;
pub mod records;
pub mod render;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::export::{export_consultation, export_invoice, export_prescription};
    pub use crate::markup::{Marker, MarkupDocument, apply_marker};
    pub use crate::records::RecordBundle;
    pub use crate::render::{render_html_str, render_markup_str};
}
