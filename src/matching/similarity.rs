//! Fuzzy similarity matching
//!
//! Scores a query against candidate questions with a normalized string
//! similarity metric. The engine only accepts the best candidate when its
//! score is strictly above the configured threshold.

// ============================================================================
// Similarity Trait
// ============================================================================

/// String similarity metric returning a score in `[0.0, 1.0]`.
///
/// Implementations must be deterministic for identical inputs.
pub trait Similarity: Send + Sync {
    /// Similarity of `a` and `b`; 1.0 means identical.
    fn score(&self, a: &str, b: &str) -> f64;

    /// Metric name.
    fn name(&self) -> &'static str;
}

// ============================================================================
// NormalizedLevenshtein
// ============================================================================

/// Edit-distance based ratio: `1 - levenshtein(a, b) / max(len)`.
///
/// Character-level, so it behaves the same for Latin and Bangla script.
pub struct NormalizedLevenshtein;

impl Similarity for NormalizedLevenshtein {
    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }

    fn name(&self) -> &'static str {
        "NormalizedLevenshtein"
    }
}

// ============================================================================
// Factory Functions
// ============================================================================

/// Default similarity metric.
pub fn default_similarity() -> Box<dyn Similarity> {
    Box::new(NormalizedLevenshtein)
}

// ============================================================================
// Matching
// ============================================================================

/// Best-scoring candidate for `query`, with its score.
///
/// Candidates are scanned in iteration order and only a strictly greater
/// score replaces the current best, so ties resolve to the first candidate
/// encountered. Callers pass candidates in a stable (lexicographic) order to
/// keep the result reproducible.
pub fn best_match<'a, I>(
    similarity: &dyn Similarity,
    query: &str,
    candidates: I,
) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;

    for candidate in candidates {
        let score = similarity.score(query, candidate);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((candidate, score)),
        }
    }

    best
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        let sim = NormalizedLevenshtein;
        assert!((sim.score("hello", "hello") - 1.0).abs() < f64::EPSILON);
        assert!((sim.score("abc", "xyz")).abs() < f64::EPSILON);

        let mid = sim.score("what is your name", "what is ur name");
        assert!(mid > 0.5 && mid < 1.0);
    }

    #[test]
    fn test_score_deterministic() {
        let sim = NormalizedLevenshtein;
        let a = sim.score("tumi kemon acho", "tumi kmn acho");
        let b = sim.score("tumi kemon acho", "tumi kmn acho");
        assert_eq!(a, b);
    }

    #[test]
    fn test_best_match_picks_highest() {
        let sim = NormalizedLevenshtein;
        let candidates = ["how are you", "what is your name", "where do you live"];
        let (key, score) =
            best_match(&sim, "what is ur name", candidates.iter().copied()).unwrap();
        assert_eq!(key, "what is your name");
        assert!(score > 0.5);
    }

    #[test]
    fn test_best_match_tie_break_first_wins() {
        struct Constant;
        impl Similarity for Constant {
            fn score(&self, _: &str, _: &str) -> f64 {
                0.7
            }
            fn name(&self) -> &'static str {
                "Constant"
            }
        }

        // All candidates score the same; the first in order must win.
        let candidates = ["alpha", "beta", "gamma"];
        let (key, score) = best_match(&Constant, "query", candidates.iter().copied()).unwrap();
        assert_eq!(key, "alpha");
        assert!((score - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_best_match_empty_candidates() {
        let sim = NormalizedLevenshtein;
        assert!(best_match(&sim, "anything", std::iter::empty()).is_none());
    }

    #[test]
    fn test_bangla_similarity() {
        let sim = NormalizedLevenshtein;
        // One missing vowel sign, still close.
        let score = sim.score("তুমি কেমন আছো", "তুমি কমন আছো");
        assert!(score > 0.8);
    }
}
