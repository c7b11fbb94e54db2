//! Single-pass markup scanning.
//!
//! One left-to-right scan per line, longest marker first, producing typed
//! segments. Unmatched or unterminated markers fall through as literal
//! text rather than erroring; the grammar is flat, so marker interiors
//! are never re-scanned.

use tracing::trace;

use super::types::{Line, LineKind, MarkupDocument, Segment, SegmentStyle};

/// Scan markup source into a document.
pub fn scan(source: &str) -> MarkupDocument {
    let lines: Vec<Line> = source.split('\n').map(scan_line).collect();
    trace!(lines = lines.len(), "scanned markup source");
    MarkupDocument::from_lines(lines)
}

/// Classify a single source line and scan its inline content. A
/// trailing `\r` is dropped so CRLF-line-ended notes scan the same as
/// LF ones.
fn scan_line(line: &str) -> Line {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() {
        return Line::empty();
    }

    if let Some(rest) = line.strip_prefix("- ")
        && !rest.is_empty()
    {
        return Line::new(LineKind::Bullet, scan_inline(rest));
    }

    if let Some((number, rest)) = split_ordered_marker(line) {
        return Line::new(LineKind::Numbered(number), scan_inline(rest));
    }

    Line::new(LineKind::Paragraph, scan_inline(line))
}

/// Split `N. text` into its number and content, if the line is an
/// ordered list item. Requires at least one digit, the `. ` delimiter,
/// and non-empty content.
fn split_ordered_marker(line: &str) -> Option<(u32, &str)> {
    let digits_len = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let number: u32 = line[..digits_len].parse().ok()?;
    let rest = line[digits_len..].strip_prefix(". ")?;
    if rest.is_empty() {
        return None;
    }
    Some((number, rest))
}

/// Scan inline content into segments.
///
/// At each position the longest candidate marker is tried first, so a
/// `**bold**` run is always consumed before its leading `*` could be
/// misread as an italic opener.
fn scan_inline(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while !rest.is_empty() {
        if let Some((inner, after)) = take_delimited(rest, "**", "**") {
            emit(&mut segments, &mut plain, inner, SegmentStyle::bold());
            rest = after;
        } else if let Some((inner, after)) = take_delimited(rest, "*", "*") {
            emit(&mut segments, &mut plain, inner, SegmentStyle::italic());
            rest = after;
        } else if let Some((inner, after)) = take_delimited(rest, "<u>", "</u>") {
            emit(&mut segments, &mut plain, inner, SegmentStyle::underline());
            rest = after;
        } else if let Some((label, url, after)) = take_link(rest) {
            let style = SegmentStyle {
                link: Some(url.to_string()),
                ..SegmentStyle::plain()
            };
            emit(&mut segments, &mut plain, label, style);
            rest = after;
        } else {
            // Literal character, including stray marker characters.
            let ch = rest.chars().next().unwrap_or('\0');
            plain.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }

    flush_plain(&mut segments, &mut plain);
    segments
}

/// If `rest` opens with `open` and a matching `close` follows, return the
/// interior and the remainder after the closer.
fn take_delimited<'a>(rest: &'a str, open: &str, close: &str) -> Option<(&'a str, &'a str)> {
    let body = rest.strip_prefix(open)?;
    let end = body.find(close)?;
    Some((&body[..end], &body[end + close.len()..]))
}

/// If `rest` opens a `[label](url)` construct, return label, url and the
/// remainder.
fn take_link(rest: &str) -> Option<(&str, &str, &str)> {
    let body = rest.strip_prefix('[')?;
    let label_end = body.find("](")?;
    let after_label = &body[label_end + 2..];
    let url_end = after_label.find(')')?;
    Some((
        &body[..label_end],
        &after_label[..url_end],
        &after_label[url_end + 1..],
    ))
}

fn flush_plain(segments: &mut Vec<Segment>, plain: &mut String) {
    if !plain.is_empty() {
        segments.push(Segment::plain(std::mem::take(plain)));
    }
}

/// Emit a styled segment, flushing pending plain text first. An empty
/// wrapped pair (e.g. `****`) is consumed but carries no content, so it
/// neither flushes nor emits.
fn emit(segments: &mut Vec<Segment>, plain: &mut String, text: &str, style: SegmentStyle) {
    if !text.is_empty() {
        flush_plain(segments, plain);
        segments.push(Segment::new(text.to_string(), style));
    }
}
