//! UTF-8 safe truncation for printing response previews.

/// Truncate to at most `max_chars` characters.
///
/// Unlike `&s[..n]` which panics if n is not at a character boundary,
/// this counts characters, so CJK replies are cut at the same visual length
/// as ASCII ones.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((boundary, _)) => &s[..boundary],
        None => s,
    }
}

/// Truncated text with a trailing `...` when anything was cut.
pub fn preview(s: &str, max_chars: usize) -> String {
    let truncated = truncate_chars(s, max_chars);
    if truncated.len() < s.len() {
        format!("{}...", truncated)
    } else {
        truncated.to_string()
    }
}
