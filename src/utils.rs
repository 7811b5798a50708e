// src/utils.rs

/// Normalize question text for fingerprinting
pub fn normalize_question(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Strip markdown code fences the generation service wraps around JSON
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let body = match trimmed.strip_prefix("```") {
        // Info string (`json`, `JSON`, ...) sits right after the opening fence
        Some(rest) => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        None => trimmed,
    }
    .trim();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Escape text for use inside HTML element content or attribute values
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Short, log-safe preview of a secret value
pub fn preview_secret(value: &str) -> String {
    let n = value
        .char_indices()
        .nth(5)
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    format!("{}...({} chars)", &value[..n], value.chars().count())
}

/// Truncate to at most `max_chars` characters, for log lines
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
