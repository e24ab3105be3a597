//! Text normalization module
//!
//! Every key stored in the knowledge base and every inbound query passes
//! through [`normalize`] before any comparison. Equality, hashing and all
//! matching strategies are defined on this canonical form only.

use std::fmt;
use std::str::FromStr;

// ============================================================================
// Language
// ============================================================================

/// Supported knowledge base locales.
///
/// The engine ships with exactly two fixed locales plus a language-agnostic
/// learned overlay (see `knowledge::Mapping`). Wire tags are lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Bangla,
    English,
}

impl Language {
    /// Wire tag for this language ("bangla" / "english").
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Bangla => "bangla",
            Language::English => "english",
        }
    }

    /// All supported languages.
    pub fn all() -> [Language; 2] {
        [Language::Bangla, Language::English]
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bangla" | "bn" => Ok(Language::Bangla),
            "english" | "en" => Ok(Language::English),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Parse failure for a language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown language tag '{}'", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

// ============================================================================
// Normalization
// ============================================================================

/// Punctuation stripped during normalization.
const STRIPPED: [char; 4] = ['?', '.', ',', '!'];

/// Canonicalize text for storage and lookup.
///
/// Trims, lowercases (a no-op on Bangla script), strips `? . , !` and
/// collapses whitespace runs to single spaces. Idempotent: normalizing twice
/// yields the same result as normalizing once. Empty input yields an empty
/// string, not an error.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .collect::<String>()
        .to_lowercase();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-delimited tokens of (already normalized) text.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("  Tumi Kemon Acho?  "), "tumi kemon acho");
        assert_eq!(normalize("What is your name?!"), "what is your name");
        assert_eq!(normalize("Hello, world."), "hello world");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("?!.,"), "");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("a   b\t c"), "a b c");
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            "Tumi kemon acho?",
            "  HELLO,  World!  ",
            "তুমি কেমন আছো?",
            "",
            "already normal",
        ];
        for s in inputs {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_normalize_preserves_bangla() {
        // Lowercasing must not corrupt non-Latin script.
        assert_eq!(normalize("তুমি কেমন আছো?"), "তুমি কেমন আছো");
    }

    #[test]
    fn test_tokenize() {
        let tokens: Vec<&str> = tokenize("tumi kemon acho").collect();
        assert_eq!(tokens, vec!["tumi", "kemon", "acho"]);
        assert_eq!(tokenize("").count(), 0);
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("bangla".parse::<Language>().unwrap(), Language::Bangla);
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert!("french".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_tag_round_trip() {
        for lang in Language::all() {
            assert_eq!(lang.tag().parse::<Language>().unwrap(), lang);
        }
    }
}
