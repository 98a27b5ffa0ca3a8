//! Character-offset helpers.
//!
//! Spans and audit records count Unicode scalar values, while Rust strings index
//! by byte. These helpers translate between the two.

/// Number of characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte position of the `char_idx`-th character. Past the end clamps to `text.len()`.
pub fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Character position of a byte offset. `byte_idx` must sit on a char boundary.
pub fn byte_to_char(text: &str, byte_idx: usize) -> usize {
    text[..byte_idx].chars().count()
}

/// Substring covering characters `[start, end)`, clamped to the text.
pub fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    let from = char_to_byte(text, start);
    let to = char_to_byte(text, end).max(from);
    &text[from..to]
}
