//! Phonetic matching
//!
//! Reduces questions to a pronunciation key and matches on exact key
//! equality. Catches spellings that sound alike but diverge on paper
//! ("kemon" / "kamon", "acho" / "aso").

// ============================================================================
// PhoneticKeyer Trait
// ============================================================================

/// Reduces text to a short code approximating its pronunciation.
pub trait PhoneticKeyer: Send + Sync {
    /// Phonetic key of (already normalized) text.
    fn key(&self, text: &str) -> String;

    /// Keyer name.
    fn name(&self) -> &'static str;
}

// ============================================================================
// Soundex
// ============================================================================

/// Classic soundex, applied per token and joined with `-`.
///
/// Soundex is only defined for ASCII letters. A token that does not start
/// with an ASCII letter (Bangla script, digits) keys to itself, so key
/// equality degenerates to plain equality and phonetic matching is
/// effectively disabled for that token instead of crashing.
pub struct Soundex;

impl Soundex {
    /// Four-character soundex code of a single token.
    fn encode_token(token: &str) -> String {
        let mut chars = token.chars();

        let first = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => c.to_ascii_lowercase(),
            _ => return token.to_string(),
        };

        let mut code = String::with_capacity(4);
        code.push(first);
        let mut last = Self::digit(first);

        for c in chars {
            if !c.is_ascii_alphabetic() {
                continue;
            }
            let c = c.to_ascii_lowercase();
            match Self::digit(c) {
                Some(d) => {
                    // Adjacent letters from the same group encode once;
                    // h/w between them do not split the group.
                    if last != Some(d) {
                        code.push(d);
                        if code.len() == 4 {
                            break;
                        }
                    }
                    last = Some(d);
                }
                None => {
                    if c != 'h' && c != 'w' {
                        last = None;
                    }
                }
            }
        }

        while code.len() < 4 {
            code.push('0');
        }
        code
    }

    /// Soundex digit group for a letter; vowels, h, w and y have none.
    fn digit(c: char) -> Option<char> {
        match c {
            'b' | 'f' | 'p' | 'v' => Some('1'),
            'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some('2'),
            'd' | 't' => Some('3'),
            'l' => Some('4'),
            'm' | 'n' => Some('5'),
            'r' => Some('6'),
            _ => None,
        }
    }
}

impl PhoneticKeyer for Soundex {
    fn key(&self, text: &str) -> String {
        text.split_whitespace()
            .map(Self::encode_token)
            .collect::<Vec<_>>()
            .join("-")
    }

    fn name(&self) -> &'static str {
        "Soundex"
    }
}

// ============================================================================
// Factory Functions
// ============================================================================

/// Default phonetic keyer.
pub fn default_keyer() -> Box<dyn PhoneticKeyer> {
    Box::new(Soundex)
}

// ============================================================================
// Matching
// ============================================================================

/// First candidate whose phonetic key equals the query's key.
pub fn first_key_match<'a, I>(
    keyer: &dyn PhoneticKeyer,
    query: &str,
    candidates: I,
) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let query_key = keyer.key(query);
    candidates
        .into_iter()
        .find(|candidate| keyer.key(candidate) == query_key)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soundex_reference_codes() {
        assert_eq!(Soundex::encode_token("robert"), "r163");
        assert_eq!(Soundex::encode_token("rupert"), "r163");
        assert_eq!(Soundex::encode_token("tymczak"), "t522");
        assert_eq!(Soundex::encode_token("pfister"), "p236");
        assert_eq!(Soundex::encode_token("honeyman"), "h555");
    }

    #[test]
    fn test_soundex_sound_alikes() {
        assert_eq!(Soundex::encode_token("kemon"), Soundex::encode_token("kamon"));
        assert_eq!(Soundex::encode_token("name"), Soundex::encode_token("naem"));
        assert_ne!(Soundex::encode_token("name"), Soundex::encode_token("game"));
    }

    #[test]
    fn test_sentence_key() {
        let keyer = Soundex;
        assert_eq!(keyer.key("tumi kemon acho"), keyer.key("tumi kamon acho"));
        assert_ne!(keyer.key("tumi kemon acho"), keyer.key("tumi kemon"));
    }

    #[test]
    fn test_bangla_token_collapses_to_itself() {
        assert_eq!(Soundex::encode_token("তুমি"), "তুমি");

        let keyer = Soundex;
        assert_eq!(keyer.key("তুমি কেমন আছো"), "তুমি-কেমন-আছো");
    }

    #[test]
    fn test_first_key_match() {
        let keyer = Soundex;
        let candidates = ["ki koro", "tumi kemon acho", "tumi ke"];
        assert_eq!(
            first_key_match(&keyer, "tumi kamon acho", candidates.iter().copied()),
            Some("tumi kemon acho")
        );
        assert_eq!(
            first_key_match(&keyer, "completely different", candidates.iter().copied()),
            None
        );
    }
}
