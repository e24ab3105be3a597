//! Stemming matching
//!
//! Reduces each word of a question to a language-aware stem and matches on
//! stem-sequence equality, so inflection differences ("play" / "playing",
//! "ছেলে" / "ছেলেরা") still find the stored answer.

use crate::text::Language;

// ============================================================================
// Stemmer Trait
// ============================================================================

/// Reduces a single word to its stem.
pub trait Stemmer: Send + Sync {
    /// Stem of one (already normalized) word.
    fn stem_word(&self, word: &str) -> String;

    /// Stemmer name.
    fn name(&self) -> &'static str;
}

// ============================================================================
// EnglishStemmer
// ============================================================================

/// Suffix rules applied longest-first; only the first matching rule fires.
const ENGLISH_SUFFIXES: [(&str, &str); 6] = [
    ("sses", "ss"),
    ("ies", "y"),
    ("ing", ""),
    ("ed", ""),
    ("ly", ""),
    ("s", ""),
];

/// Lightweight deterministic English suffix stripper.
///
/// Not a full Porter stemmer: both sides of a comparison pass through the
/// same rules, so consistency matters more than linguistic precision here.
pub struct EnglishStemmer;

impl Stemmer for EnglishStemmer {
    fn stem_word(&self, word: &str) -> String {
        for (suffix, replacement) in ENGLISH_SUFFIXES {
            if let Some(base) = word.strip_suffix(suffix) {
                let stem = format!("{base}{replacement}");
                // Refuse stems that collapse the word to almost nothing
                // ("ring" must not become "r").
                if stem.chars().count() >= 2 {
                    return stem;
                }
            }
        }
        word.to_string()
    }

    fn name(&self) -> &'static str {
        "EnglishStemmer"
    }
}

// ============================================================================
// BanglaStemmer
// ============================================================================

/// Common Bengali inflection endings: plural markers, classifiers and case
/// endings. Longest-first, one strip per word.
const BANGLA_SUFFIXES: [&str; 10] = [
    "গুলো", "গুলি", "খানা", "দের", "রা", "টা", "টি", "কে", "ের", "ে",
];

/// Suffix stripper for Bengali script.
pub struct BanglaStemmer;

impl Stemmer for BanglaStemmer {
    fn stem_word(&self, word: &str) -> String {
        for suffix in BANGLA_SUFFIXES {
            if let Some(base) = word.strip_suffix(suffix) {
                if base.chars().count() >= 2 {
                    return base.to_string();
                }
            }
        }
        word.to_string()
    }

    fn name(&self) -> &'static str {
        "BanglaStemmer"
    }
}

// ============================================================================
// Factory Functions
// ============================================================================

/// Stemmer for a language tag.
pub fn stemmer_for(language: Language) -> Box<dyn Stemmer> {
    match language {
        Language::Bangla => Box::new(BanglaStemmer),
        Language::English => Box::new(EnglishStemmer),
    }
}

// ============================================================================
// Matching
// ============================================================================

/// Stems every whitespace token and rejoins with single spaces.
pub fn stem_text(stemmer: &dyn Stemmer, text: &str) -> String {
    text.split_whitespace()
        .map(|word| stemmer.stem_word(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// First candidate whose stemmed form equals the query's stemmed form.
pub fn first_stem_match<'a, I>(
    stemmer: &dyn Stemmer,
    query: &str,
    candidates: I,
) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let query_stem = stem_text(stemmer, query);
    candidates
        .into_iter()
        .find(|candidate| stem_text(stemmer, candidate) == query_stem)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_suffixes() {
        let s = EnglishStemmer;
        assert_eq!(s.stem_word("playing"), "play");
        assert_eq!(s.stem_word("played"), "play");
        assert_eq!(s.stem_word("plays"), "play");
        assert_eq!(s.stem_word("classes"), "class");
        assert_eq!(s.stem_word("stories"), "story");
        assert_eq!(s.stem_word("quickly"), "quick");
    }

    #[test]
    fn test_english_short_word_guard() {
        let s = EnglishStemmer;
        // Stripping would leave a single character; keep the word.
        assert_eq!(s.stem_word("ring"), "ring");
        assert_eq!(s.stem_word("is"), "is");
        assert_eq!(s.stem_word("go"), "go");
    }

    #[test]
    fn test_english_stem_equality_across_inflection() {
        let s = EnglishStemmer;
        assert_eq!(
            stem_text(&s, "what are you playing"),
            stem_text(&s, "what are you play")
        );
    }

    #[test]
    fn test_bangla_suffixes() {
        let s = BanglaStemmer;
        assert_eq!(s.stem_word("ছেলেরা"), "ছেলে");
        assert_eq!(s.stem_word("বইগুলো"), "বই");
        assert_eq!(s.stem_word("আছে"), "আছ");
        // No matching suffix: unchanged.
        assert_eq!(s.stem_word("কেমন"), "কেমন");
    }

    #[test]
    fn test_bangla_short_word_guard() {
        let s = BanglaStemmer;
        // Remaining stem would be a single character; keep the word.
        assert_eq!(s.stem_word("কে"), "কে");
    }

    #[test]
    fn test_stem_text_rejoins_single_spaces() {
        let s = EnglishStemmer;
        assert_eq!(stem_text(&s, "playing games"), "play game");
    }

    #[test]
    fn test_first_stem_match() {
        let s = EnglishStemmer;
        let candidates = ["how are you", "what games do you play"];
        assert_eq!(
            first_stem_match(&s, "what games do you playing", candidates.iter().copied()),
            Some("what games do you play")
        );
        assert_eq!(
            first_stem_match(&s, "unrelated words here", candidates.iter().copied()),
            None
        );
    }

    #[test]
    fn test_stemmer_for_language() {
        assert_eq!(stemmer_for(Language::English).name(), "EnglishStemmer");
        assert_eq!(stemmer_for(Language::Bangla).name(), "BanglaStemmer");
    }
}
