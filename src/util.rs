//! Small helpers shared by the gateway and the CLI.

/// Maximum number of characters of a question echoed into log lines.
pub const LOG_PREVIEW_CHARS: usize = 100;

/// Truncate `s` to at most `max_chars` characters, appending "..." when cut.
///
/// Counts characters rather than bytes, so multi-byte text (CJK, emoji) is
/// never split in the middle of a code point.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", s[..idx].trim_end()),
        None => s.to_string(),
    }
}

/// Single-line preview of user text for logging.
///
/// Runs of whitespace (including newlines) collapse to one space so a
/// multi-line question stays on one log line.
pub fn log_preview(s: &str) -> String {
    let flattened = s.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_with_ellipsis(&flattened, LOG_PREVIEW_CHARS)
}
