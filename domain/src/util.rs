//! Shared string helpers.

/// Truncate a string to at most `max_bytes` without splitting a UTF-8
/// character boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// One-line summary of a message: its first line, cut to `max_bytes`,
/// with `...` appended when anything was dropped.
pub fn summarize(message: &str, max_bytes: usize) -> String {
    let first_line = message.lines().next().unwrap_or("").trim_end();
    let cut = truncate_str(first_line, max_bytes);
    if cut.len() < message.trim_end().len() {
        format!("{}...", cut)
    } else {
        cut.to_string()
    }
}
