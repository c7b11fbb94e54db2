//! Core markup types.

/// Inline style of a single segment.
///
/// The grammar is flat: each recognized construct produces exactly one
/// styled segment, and marker interiors are plain text. No nesting
/// semantics are defined (bold-inside-italic is not a combination the
/// editor can produce).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Target URL when the segment is a hyperlink label.
    pub link: Option<String>,
}

impl SegmentStyle {
    pub const fn plain() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            link: None,
        }
    }

    pub const fn bold() -> Self {
        Self {
            bold: true,
            italic: false,
            underline: false,
            link: None,
        }
    }

    pub const fn italic() -> Self {
        Self {
            bold: false,
            italic: true,
            underline: false,
            link: None,
        }
    }

    pub const fn underline() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: true,
            link: None,
        }
    }

    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic && !self.underline && self.link.is_none()
    }
}

/// A contiguous run of text carrying one formatting state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    text: String,
    style: SegmentStyle,
}

impl Segment {
    pub const fn new(text: String, style: SegmentStyle) -> Self {
        Self { text, style }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text.into(), SegmentStyle::plain())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> &SegmentStyle {
        &self.style
    }
}

/// Block-level classification of a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Normal paragraph text
    Paragraph,
    /// `- text` bullet list item
    Bullet,
    /// `N. text` ordered list item, carrying the authored number
    Numbered(u32),
    /// Blank line
    Empty,
}

impl LineKind {
    /// Whether this line participates in list grouping.
    pub const fn is_list_item(self) -> bool {
        matches!(self, Self::Bullet | Self::Numbered(_))
    }
}

/// One source line: its block kind plus inline segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    kind: LineKind,
    segments: Vec<Segment>,
}

impl Line {
    pub const fn new(kind: LineKind, segments: Vec<Segment>) -> Self {
        Self { kind, segments }
    }

    pub const fn empty() -> Self {
        Self {
            kind: LineKind::Empty,
            segments: Vec::new(),
        }
    }

    pub const fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Concatenated text content with all marker syntax stripped.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push_str(segment.text());
        }
        out
    }
}

/// A parsed markup document: an ordered sequence of classified lines.
///
/// Parsing is a pure function of the source string and never fails;
/// unmatched markers degrade to literal text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupDocument {
    lines: Vec<Line>,
}

impl MarkupDocument {
    pub(crate) const fn from_lines(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Parse markup source into a document.
    pub fn parse(source: &str) -> Self {
        super::scanner::scan(source)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
