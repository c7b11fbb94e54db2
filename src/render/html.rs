//! Sanitized HTML rendering target.
//!
//! The output of [`render_html`] is the trust boundary: every character
//! of user text passes through [`escape_html`] before concatenation,
//! so raw markup-like input that is not one of the recognized
//! constructs can never reach the display surface unescaped.

use tracing::trace;

use crate::markup::{Line, LineKind, MarkupDocument, Segment};

/// Render a parsed markup document to a safe HTML fragment.
pub fn render_html(doc: &MarkupDocument) -> String {
    let mut out = String::new();
    let mut open_list: Option<ListTag> = None;
    let mut needs_break = false;

    for line in doc.lines() {
        let tag = ListTag::for_kind(line.kind());

        if open_list != tag {
            if let Some(prev) = open_list {
                out.push_str(prev.close());
            }
            if let Some(next) = tag {
                out.push_str(next.open());
            }
            open_list = tag;
        }

        match line.kind() {
            LineKind::Bullet | LineKind::Numbered(_) => {
                out.push_str("<li>");
                render_segments(&mut out, line);
                out.push_str("</li>");
                needs_break = false;
            }
            LineKind::Paragraph => {
                if needs_break {
                    out.push_str("<br />");
                }
                render_segments(&mut out, line);
                needs_break = true;
            }
            LineKind::Empty => {
                if needs_break {
                    out.push_str("<br />");
                }
                needs_break = true;
            }
        }
    }

    if let Some(prev) = open_list {
        out.push_str(prev.close());
    }

    trace!(bytes = out.len(), "rendered html fragment");
    out
}

/// Parse-and-render convenience for stored markup fields.
pub fn render_html_str(markup: &str) -> String {
    render_html(&MarkupDocument::parse(markup))
}

/// List container state. Bulleted and numbered runs group separately;
/// a kind change closes the open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListTag {
    Unordered,
    Ordered,
}

impl ListTag {
    const fn for_kind(kind: LineKind) -> Option<Self> {
        match kind {
            LineKind::Bullet => Some(Self::Unordered),
            LineKind::Numbered(_) => Some(Self::Ordered),
            LineKind::Paragraph | LineKind::Empty => None,
        }
    }

    const fn open(self) -> &'static str {
        match self {
            Self::Unordered => "<ul>",
            Self::Ordered => "<ol>",
        }
    }

    const fn close(self) -> &'static str {
        match self {
            Self::Unordered => "</ul>",
            Self::Ordered => "</ol>",
        }
    }
}

fn render_segments(out: &mut String, line: &Line) {
    for segment in line.segments() {
        render_segment(out, segment);
    }
}

fn render_segment(out: &mut String, segment: &Segment) {
    let style = segment.style();

    if let Some(url) = &style.link {
        if is_safe_url(url) {
            out.push_str("<a href=\"");
            out.push_str(&escape_html(url));
            out.push_str("\">");
            out.push_str(&escape_html(segment.text()));
            out.push_str("</a>");
        } else {
            // Scripting schemes are neutralized to the bare label.
            out.push_str(&escape_html(segment.text()));
        }
        return;
    }

    if style.bold {
        out.push_str("<strong>");
    }
    if style.italic {
        out.push_str("<em>");
    }
    if style.underline {
        out.push_str("<u>");
    }

    out.push_str(&escape_html(segment.text()));

    if style.underline {
        out.push_str("</u>");
    }
    if style.italic {
        out.push_str("</em>");
    }
    if style.bold {
        out.push_str("</strong>");
    }
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reject URLs whose scheme could execute in the viewer.
///
/// HTML URL parsing strips ASCII tab and newline characters, so the
/// scheme is extracted from the same canonical form a browser would
/// see; `java\tscript:` cannot slip past the blocklist.
fn is_safe_url(url: &str) -> bool {
    let canonical: String = url.chars().filter(|c| !c.is_ascii_control()).collect();
    let trimmed = canonical.trim_start();
    let scheme: String = trimmed
        .chars()
        .take_while(|c| *c != ':' && *c != '/' && *c != '?' && *c != '#')
        .collect::<String>()
        .to_ascii_lowercase();
    if !trimmed[scheme.len()..].starts_with(':') {
        // Scheme-relative or relative URL.
        return true;
    }
    !matches!(scheme.as_str(), "javascript" | "data" | "vbscript")
}
