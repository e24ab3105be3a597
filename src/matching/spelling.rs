//! Spelling correction pre-pass
//!
//! English-only: out-of-dictionary words are replaced with the top SymSpell
//! suggestion before the query reaches the matchers, so "whats your naem"
//! can still hit "whats your name". The dictionary is built once and the
//! corrector is immutable afterwards; `correct` never mutates shared state.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use symspell::{SymSpell, SymSpellBuilder, UnicodeStringStrategy, Verbosity};

/// Word-frequency list bundled with the crate, one `word count` per line.
const BUILTIN_DICTIONARY: &str = include_str!("../../assets/english-words.txt");

/// Maximum edit distance accepted for a suggestion.
const MAX_EDIT_DISTANCE: i64 = 2;

/// Words shorter than this are never corrected ("ur" must not become "or").
const MIN_WORD_LEN: usize = 3;

// ============================================================================
// SpellCorrector
// ============================================================================

/// Dictionary-backed spelling corrector.
pub struct SpellCorrector {
    symspell: SymSpell<UnicodeStringStrategy>,
}

impl SpellCorrector {
    /// Corrector over the bundled English word list.
    pub fn builtin() -> Result<Self> {
        Self::from_lines(BUILTIN_DICTIONARY.lines())
    }

    /// Corrector over a custom `word count` frequency file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary {}", path.display()))?;
        Self::from_lines(contents.lines())
    }

    fn from_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Self> {
        let mut symspell: SymSpell<UnicodeStringStrategy> = SymSpellBuilder::default()
            .max_dictionary_edit_distance(MAX_EDIT_DISTANCE)
            .prefix_length(7)
            .build()
            .map_err(|e| anyhow!("Failed to build SymSpell: {}", e))?;

        let mut loaded = 0usize;
        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if symspell.load_dictionary_line(line, 0, 1, " ") {
                loaded += 1;
            }
        }

        if loaded == 0 {
            return Err(anyhow!("Dictionary contains no usable entries"));
        }

        tracing::debug!("Spelling dictionary loaded ({} words)", loaded);
        Ok(Self { symspell })
    }

    /// Replace out-of-dictionary words with their top suggestion.
    ///
    /// Tokens that are short, non-ASCII (Bangla script) or already in the
    /// dictionary pass through unchanged, as do tokens with no suggestion
    /// within the edit-distance budget.
    pub fn correct(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|word| self.correct_word(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn correct_word(&self, word: &str) -> String {
        if word.chars().count() < MIN_WORD_LEN || !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return word.to_string();
        }

        let suggestions = self.symspell.lookup(word, Verbosity::Top, MAX_EDIT_DISTANCE);
        match suggestions.first() {
            // Distance 0 means the word is already in the dictionary.
            Some(s) if s.distance > 0 => s.term.clone(),
            _ => word.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn corrector() -> SpellCorrector {
        SpellCorrector::builtin().unwrap()
    }

    #[test]
    fn test_corrects_misspelled_word() {
        let c = corrector();
        assert_eq!(c.correct("what is your naem"), "what is your name");
    }

    #[test]
    fn test_keeps_in_dictionary_words() {
        let c = corrector();
        assert_eq!(c.correct("what is your name"), "what is your name");
    }

    #[test]
    fn test_skips_short_and_non_ascii_tokens() {
        let c = corrector();
        assert_eq!(c.correct("hi"), "hi");
        assert_eq!(c.correct("তুমি কেমন আছো"), "তুমি কেমন আছো");
    }

    #[test]
    fn test_empty_input() {
        let c = corrector();
        assert_eq!(c.correct(""), "");
    }

    #[test]
    fn test_unknown_gibberish_left_alone() {
        let c = corrector();
        // Nothing within edit distance 2; the token survives untouched.
        assert_eq!(c.correct("zzxqwvzz"), "zzxqwvzz");
    }

    #[test]
    fn test_rejects_empty_dictionary() {
        assert!(SpellCorrector::from_lines(std::iter::empty()).is_err());
    }
}
