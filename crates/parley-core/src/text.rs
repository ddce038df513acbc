//! Bounded text
//!
//! Client input is stored in bounded fields. Anything longer is truncated,
//! never rejected.

/// Maximum length of a display name, in bytes
pub const MAX_NAME_LEN: usize = 199;

/// Maximum length of a command line, in bytes
pub const MAX_LINE_LEN: usize = 999;

/// Maximum length of a poll question, in bytes
pub const MAX_QUESTION_LEN: usize = 999;

/// Maximum length of a single poll answer, in bytes
pub const MAX_OPTION_LEN: usize = 199;

/// Truncate `text` to at most `max_len` bytes without splitting a character.
pub fn truncate(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }

    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Strip a trailing `\n` or `\r\n` from a received line.
pub fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Normalise a display name: terminator and surrounding whitespace removed,
/// then bounded to [`MAX_NAME_LEN`].
pub fn normalize_name(raw: &str) -> String {
    truncate(strip_line_terminator(raw).trim(), MAX_NAME_LEN).to_string()
}
