//! Utility functions shared by the engine passes.

/// Encodes a field name the way it appears inside a JSON string literal.
///
/// Quotes, backslashes and control characters are escaped; everything else,
/// including multi-byte characters, is kept verbatim.
pub fn encode_name(raw: &str) -> String {
    let quoted = serde_json::to_string(raw).unwrap_or_else(|_| format!("\"{raw}\""));
    quoted[1..quoted.len() - 1].to_string()
}

/// Normalizes text for comparison by lowercasing and replacing separators with spaces.
pub fn normalize_text(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', '-', '.', '/', '\\', '(', ')'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true if `name` can follow a `.` property accessor.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$')
}
