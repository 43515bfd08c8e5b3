//! Utility functions.

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Works on character boundaries, so multi-byte text is never split.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Sanitize a string for safe logging (redact API keys and bot tokens).
///
/// HTTP client errors embed the request URL, and Telegram URLs carry the bot
/// token, so anything derived from a request error goes through here.
pub fn sanitize_for_log(s: &str) -> String {
    let patterns: &[(&str, &str)] = &[
        (r"bot\d{5,}:[A-Za-z0-9_-]{20,}", "bot***REDACTED_BOT_TOKEN***"),
        (r"(?i)(api[_-]?key|apikey)[=:]\s*\S{20,}", "$1=***REDACTED***"),
        (r"(?i)(token|secret|bearer)\s*[=:]\s*\S{10,}", "$1=***REDACTED***"),
        (r"sk-[a-zA-Z0-9_-]{20,}", "***REDACTED_API_KEY***"),
    ];

    let mut result = s.to_string();
    for (pattern, replacement) in patterns {
        if let Ok(re) = regex::Regex::new(pattern) {
            result = re.replace_all(&result, *replacement).to_string();
        }
    }
    result
}
