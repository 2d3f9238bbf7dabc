//! UTF-8 helpers for presenting binary contents as text.
//!
//! Byte arrays may hold arbitrary data, so text views are produced by an
//! explicit sanitization pass rather than by failing on invalid input.

use std::borrow::Cow;

/// Character substituted for each invalid UTF-8 sequence.
pub const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// Result of sanitizing a byte slice into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized<'a> {
    /// The text, borrowed when the input was already valid UTF-8.
    pub text: Cow<'a, str>,
    /// Number of invalid sequences that were replaced.
    pub replacements: usize,
}

impl Sanitized<'_> {
    /// Returns `true` if the input was valid UTF-8.
    #[must_use]
    pub const fn is_lossless(&self) -> bool {
        self.replacements == 0
    }
}

/// Converts bytes to text, replacing each maximal invalid UTF-8 sequence
/// with [`REPLACEMENT`].
///
/// Valid input is borrowed without copying.
///
/// # Examples
///
/// ```
/// use bytearray_rs::io::sanitize_utf8;
///
/// let clean = sanitize_utf8(b"hello");
/// assert!(clean.is_lossless());
///
/// let dirty = sanitize_utf8(b"a\xffb");
/// assert_eq!(dirty.text, "a\u{FFFD}b");
/// assert_eq!(dirty.replacements, 1);
/// ```
#[must_use]
pub fn sanitize_utf8(bytes: &[u8]) -> Sanitized<'_> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Sanitized {
            text: Cow::Borrowed(text),
            replacements: 0,
        };
    }

    let mut text = String::with_capacity(bytes.len());
    let mut replacements = 0;
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        if !chunk.invalid().is_empty() {
            text.push(REPLACEMENT);
            replacements += 1;
        }
    }

    Sanitized {
        text: Cow::Owned(text),
        replacements,
    }
}

/// Finds a valid UTF-8 character boundary at or before the given position.
///
/// # Examples
///
/// ```
/// use bytearray_rs::io::find_char_boundary;
///
/// let s = "Hello 世界";
/// assert_eq!(find_char_boundary(s, 6), 6); // Before '世'
/// assert_eq!(find_char_boundary(s, 7), 6); // Middle of '世', backs up
/// ```
#[must_use]
pub const fn find_char_boundary(s: &str, pos: usize) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    let bytes = s.as_bytes();
    let mut boundary = pos;
    // UTF-8 continuation bytes start with 10xxxxxx (0x80-0xBF)
    while boundary > 0 && (bytes[boundary] & 0xC0) == 0x80 {
        boundary -= 1;
    }
    boundary
}

/// Truncates text to at most `max_bytes`, never splitting a character.
#[must_use]
pub fn truncate_at_boundary(s: &str, max_bytes: usize) -> &str {
    &s[..find_char_boundary(s, max_bytes)]
}
