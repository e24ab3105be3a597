//! Matching module - the fallback matching strategies
//!
//! Each strategy sits behind a narrow trait so the concrete algorithm can be
//! swapped without touching the pipeline in `knowledge::reply`:
//! - Similarity: normalized edit-distance ratio over whole questions
//! - PhoneticKeyer: soundex pronunciation keys
//! - Stemmer: language-aware suffix stripping
//! - SpellCorrector: SymSpell dictionary pre-pass (English only)

mod phonetic;
mod similarity;
mod spelling;
mod stemming;

// Re-exports
pub use phonetic::{first_key_match, default_keyer, PhoneticKeyer, Soundex};
pub use similarity::{best_match, default_similarity, NormalizedLevenshtein, Similarity};
pub use spelling::SpellCorrector;
pub use stemming::{
    first_stem_match, stem_text, stemmer_for, BanglaStemmer, EnglishStemmer, Stemmer,
};
