//! Shared normalisation for messy extracted policy text.

use std::ops::RangeInclusive;

pub const RECOMMENDED_MARKER: &str = "Recommended actions:";
pub const ELIGIBILITY_MARKER: &str = "Eligibility:";

/// Bullet glyphs seen in extracted PDFs, including the mojibake form of `○`.
pub const BULLET_GLYPHS: [&str; 7] = ["â—‹", "○", "•", "●", "◦", "▪", "■"];

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn replace_bullets(text: &str, with: &str) -> String {
    BULLET_GLYPHS.iter().fold(text.to_string(), |acc, glyph| acc.replace(glyph, with))
}

/// Everything after the first case-insensitive "Recommended actions:",
/// trimmed; the whole text when the marker is absent.
pub fn after_recommended_marker(text: &str) -> &str {
    match find_ignore_ascii_case(text, RECOMMENDED_MARKER) {
        Some(idx) => text[idx + RECOMMENDED_MARKER.len()..].trim(),
        None => text,
    }
}

/// Byte offset of `needle` (ASCII) in `haystack`, ignoring ASCII case.
/// Offsets returned are always char boundaries since the match starts on an
/// ASCII byte.
pub fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || n.len() > h.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Length in bytes of a numbered-item marker starting at `i`, if any.
///
/// A marker is one ASCII digit from `digits`, preceded by the start of the
/// text, whitespace, or one of `:;()`, followed by `.` and then a whitespace
/// byte (included in the length). With `allow_at_end`, a marker may also
/// end the text. "10.5", "v2. " and "within 12. hours" are not markers.
pub fn numbered_marker_at(bytes: &[u8], i: usize, digits: &RangeInclusive<u8>, allow_at_end: bool) -> Option<usize> {
    let d = *bytes.get(i)?;
    if !d.is_ascii_digit() || !digits.contains(&(d - b'0')) {
        return None;
    }
    let boundary = i == 0 || matches!(bytes[i - 1], b' ' | b'\t' | b'\n' | b'\r' | b':' | b';' | b'(' | b')');
    if !boundary || bytes.get(i + 1) != Some(&b'.') {
        return None;
    }
    match bytes.get(i + 2) {
        Some(b) if b.is_ascii_whitespace() => Some(3),
        None if allow_at_end => Some(2),
        _ => None,
    }
}
