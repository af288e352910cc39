//! Redaction helpers for logging API activity.

use regex::Regex;
use std::sync::OnceLock;

fn resource_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"[a-zA-Z]+_[a-zA-Z0-9]{20,}").ok())
        .as_ref()
}

/// Mask a secret for display, keeping the first and last four characters.
///
/// Values of eight characters or fewer are fully masked.
///
/// ```rust
/// use column_sdk::client::mask_secret;
///
/// assert_eq!(mask_secret("col_live_abcdefgh1234"), "col_...1234");
/// assert_eq!(mask_secret("short"), "****");
/// ```
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Replace Column object ids (`prefix_<20+ alphanumerics>`) in a path with `[ID]`.
pub fn sanitize_endpoint(endpoint: &str) -> String {
    match resource_id_pattern() {
        Some(pattern) => pattern.replace_all(endpoint, "[ID]").into_owned(),
        None => endpoint.to_string(),
    }
}

/// Whether a string has the shape of a Column API key.
pub fn is_valid_api_key(key: &str) -> bool {
    key.len() >= 20
        && key
            .strip_prefix("col_")
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()))
}

#[cfg(test)]
#[path = "sanitize_tests.rs"]
mod tests;
