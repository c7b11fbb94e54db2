//! Selection-wrapping markup encoder.
//!
//! The editing surface hands its full buffer and selected range in
//! explicitly; the encoder is a stateless transform returning the new
//! buffer and caret. Offsets are character offsets, so multi-byte text
//! can never be split mid-character.

use thiserror::Error;

/// Errors from encoder operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    /// The selection offsets do not describe a valid range in the buffer.
    #[error("invalid selection range {start}..{end} for buffer of {len} characters")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },
}

/// A formatting marker the editor toolbar can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Bold,
    Italic,
    Underline,
    BulletList,
    NumberedList,
    Link,
}

impl Marker {
    /// Opening marker text, inserted before the selection.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Bold => "**",
            Self::Italic => "*",
            Self::Underline => "<u>",
            Self::BulletList => "\n- ",
            Self::NumberedList => "\n1. ",
            Self::Link => "[",
        }
    }

    /// Closing marker text, inserted after the selection. Block markers
    /// (lists) have no suffix; they only open a new line item.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Bold => "**",
            Self::Italic => "*",
            Self::Underline => "</u>",
            Self::BulletList | Self::NumberedList => "",
            Self::Link => "](url)",
        }
    }
}

/// Result of applying a marker to a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// The new full buffer.
    pub buffer: String,
    /// New caret position in characters, just past the opening marker,
    /// so typing resumes inside the wrapped span.
    pub caret: usize,
}

/// Wrap the selected character range `[start, end)` of `buffer` in the
/// marker's prefix/suffix pair.
///
/// An empty selection (`start == end`) inserts an empty wrapped pair to
/// start typing inside new emphasis. No balancing is validated; the
/// renderers degrade unmatched markers to literal text.
pub fn apply_marker(
    buffer: &str,
    start: usize,
    end: usize,
    marker: Marker,
) -> Result<Edit, MarkupError> {
    let len = buffer.chars().count();
    if start > end || end > len {
        return Err(MarkupError::InvalidRange { start, end, len });
    }

    let start_byte = char_to_byte(buffer, start);
    let end_byte = char_to_byte(buffer, end);

    let prefix = marker.prefix();
    let suffix = marker.suffix();

    let mut out = String::with_capacity(buffer.len() + prefix.len() + suffix.len());
    out.push_str(&buffer[..start_byte]);
    out.push_str(prefix);
    out.push_str(&buffer[start_byte..end_byte]);
    out.push_str(suffix);
    out.push_str(&buffer[end_byte..]);

    Ok(Edit {
        buffer: out,
        caret: start + prefix.chars().count(),
    })
}

/// Byte offset of the `char_idx`-th character. `char_idx` must be at
/// most the character count of `s`.
fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map_or(s.len(), |(byte_idx, _)| byte_idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_selection_bold() {
        let edit = apply_marker("take two tablets", 5, 8, Marker::Bold).unwrap();
        assert_eq!(edit.buffer, "take **two** tablets");
        assert_eq!(edit.caret, 7);
    }

    #[test]
    fn test_wrap_selection_italic() {
        let edit = apply_marker("ab", 0, 2, Marker::Italic).unwrap();
        assert_eq!(edit.buffer, "*ab*");
        assert_eq!(edit.caret, 1);
    }

    #[test]
    fn test_wrap_selection_underline() {
        let edit = apply_marker("with food", 5, 9, Marker::Underline).unwrap();
        assert_eq!(edit.buffer, "with <u>food</u>");
        assert_eq!(edit.caret, 8);
    }

    #[test]
    fn test_link_wraps_label_with_url_placeholder() {
        let edit = apply_marker("see here", 4, 8, Marker::Link).unwrap();
        assert_eq!(edit.buffer, "see [here](url)");
        assert_eq!(edit.caret, 5);
    }

    #[test]
    fn test_empty_selection_inserts_empty_pair() {
        let edit = apply_marker("note", 4, 4, Marker::Bold).unwrap();
        assert_eq!(edit.buffer, "note****");
        assert_eq!(edit.caret, 6);
    }

    #[test]
    fn test_block_marker_inserts_at_caret() {
        let edit = apply_marker("notes", 5, 5, Marker::BulletList).unwrap();
        assert_eq!(edit.buffer, "notes\n- ");
        assert_eq!(edit.caret, 8);

        let edit = apply_marker("notes", 5, 5, Marker::NumberedList).unwrap();
        assert_eq!(edit.buffer, "notes\n1. ");
        assert_eq!(edit.caret, 9);
    }

    #[test]
    fn test_multibyte_selection_is_char_aligned() {
        // "céphalées" — selecting chars 0..9 must wrap the whole word
        // without splitting the 'é' code points.
        let edit = apply_marker("céphalées sévères", 0, 9, Marker::Bold).unwrap();
        assert_eq!(edit.buffer, "**céphalées** sévères");
        assert_eq!(edit.caret, 2);
    }

    #[test]
    fn test_range_beyond_buffer_is_rejected() {
        let err = apply_marker("ab", 0, 3, Marker::Bold).unwrap_err();
        assert_eq!(
            err,
            MarkupError::InvalidRange {
                start: 0,
                end: 3,
                len: 2
            }
        );
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert!(apply_marker("abc", 2, 1, Marker::Italic).is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn wrap_is_splice_in_char_space(
                buffer in ".{0,40}",
                a in 0..40usize,
                b in 0..40usize,
            ) {
                let len = buffer.chars().count();
                let start = a.min(b).min(len);
                let end = a.max(b).min(len);

                let edit = apply_marker(&buffer, start, end, Marker::Bold).unwrap();
                let chars: Vec<char> = buffer.chars().collect();
                let before: String = chars[..start].iter().collect();
                let selected: String = chars[start..end].iter().collect();
                let after: String = chars[end..].iter().collect();

                prop_assert_eq!(
                    edit.buffer,
                    format!("{before}**{selected}**{after}")
                );
                prop_assert_eq!(edit.caret, start + 2);
            }

            #[test]
            fn wrapped_buffer_gains_exactly_marker_chars(
                buffer in "[a-zà-ÿ ]{0,30}",
                a in 0..30usize,
                b in 0..30usize,
            ) {
                let len = buffer.chars().count();
                let start = a.min(b).min(len);
                let end = a.max(b).min(len);

                for marker in [
                    Marker::Bold,
                    Marker::Italic,
                    Marker::Underline,
                    Marker::Link,
                ] {
                    let edit = apply_marker(&buffer, start, end, marker).unwrap();
                    let added =
                        marker.prefix().chars().count() + marker.suffix().chars().count();
                    prop_assert_eq!(edit.buffer.chars().count(), len + added);
                }
            }
        }
    }
}
