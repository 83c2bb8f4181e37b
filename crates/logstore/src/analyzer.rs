//! Text Analysis
//!
//! Text fields are split on whitespace into positions. Each position keeps
//! its full token (surrounding punctuation trimmed, lower-cased) plus the
//! alphanumeric parts of compound tokens, so `java.lang.NullPointerException`
//! is found by `NullPointerException` as well as by the full name.

/// The searchable forms of one token position. The first entry is the full token.
pub type Position = Vec<String>;

/// Normalize a single query or document term.
///
/// Returns `None` when nothing alphanumeric remains.
pub fn normalize_term(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches(|c: char| !c.is_alphanumeric());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Analyze a text field value into token positions.
pub fn analyze(text: &str) -> Vec<Position> {
    text.split_whitespace()
        .filter_map(|raw| {
            let full = normalize_term(raw)?;
            let mut forms = vec![full.clone()];
            for part in full.split(|c: char| !c.is_alphanumeric()) {
                if !part.is_empty() && !forms.iter().any(|f| f == part) {
                    forms.push(part.to_string());
                }
            }
            Some(forms)
        })
        .collect()
}

/// Split phrase text into normalized terms.
pub fn analyze_phrase(text: &str) -> Vec<String> {
    text.split_whitespace().filter_map(normalize_term).collect()
}
