//! Text normalization shared by every matching and parsing strategy.
//!
//! Two flavors:
//! - `normalize`: uppercase, keep only `[A-Z0-9]`. Code-to-code comparison.
//! - `clean_text`: lowercase, strip spaces/hyphens/underscores. Looser
//!   containment checks against titles and simplified IDs.
//!
//! Missing input is an empty string, never an error.

/// Normalize text for code matching: uppercase, alphanumerics only.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Lighter-weight cleanup for free-text containment checks.
pub fn clean_text(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect()
}

/// String-similarity strategy. Pluggable so the matcher cascade can be
/// tested with a stub scorer returning fixed values.
pub trait SimilarityScorer {
    /// Symmetric ratio in [0, 1] over case-folded inputs. Identical strings
    /// score 1.0, disjoint strings near 0.
    fn ratio(&self, a: &str, b: &str) -> f64;
}

/// Default scorer: normalized Levenshtein over lowercased inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinScorer;

impl SimilarityScorer for LevenshteinScorer {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
    }
}

/// Convenience wrapper using the default scorer.
pub fn similarity(a: &str, b: &str) -> f64 {
    LevenshteinScorer.ratio(a, b)
}
