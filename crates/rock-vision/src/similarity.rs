/// Minimum similarity for an OCR token to count as a known label
pub const NEEDED_SIMILARITY: f64 = 0.82;

/// Normalized Levenshtein similarity in `[0, 1]`: one minus the edit
/// distance over the longer string's length in chars. Two empty strings are
/// identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

pub fn is_similar(observed: &str, label: &str) -> bool {
    similarity(observed, label) >= NEEDED_SIMILARITY
}
