//! Logging utilities
//!
//! Helpers for keeping raw model output and payloads readable in debug logs

/// Truncate a string with a note about the original length
pub fn truncate_content(s: &str, max_len: usize) -> String {
    if s.len() > max_len {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... ({} chars truncated)", &s[..end], s.len() - end)
    } else {
        s.to_string()
    }
}

/// Short summary of a media payload for logs: mime plus encoded size
pub fn describe_payload(mime: &str, data: &str) -> String {
    format!("{} ({} base64 chars)", mime, data.len())
}
