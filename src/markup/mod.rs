//! Markup grammar: encoding, scanning, typed segments.
//!
//! The grammar is the fixed six-construct set a clinical note editor
//! produces: `**bold**`, `*italic*`, `<u>underline</u>`, `- ` bullet
//! items, `N. ` numbered items, and `[label](url)` links. Everything
//! else is literal text.

pub mod editor;
pub mod scanner;
pub mod types;

pub use editor::{Edit, Marker, MarkupError, apply_marker};
pub use types::{Line, LineKind, MarkupDocument, Segment, SegmentStyle};
