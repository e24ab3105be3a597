//! bondhu - Bangla/English FAQ chatbot engine
//!
//! Answers free-text questions from a teachable knowledge base, falling back
//! through progressively looser matching strategies (exact, fuzzy, phonetic,
//! stemmed) before giving up with a fixed default reply.

pub mod cli;
pub mod knowledge;
pub mod matching;
pub mod text;

// Re-exports
pub use knowledge::{
    default_reply, EngineConfig, EngineError, Entry, KnowledgeStore, LearnMode, LearnRequest,
    LearnResponse, Mapping, MatchResult, MatchStrategy, ReplyEngine, ReplyRequest,
    ReplyResponse, StoreError, StoreStats, ValidationError, get_data_dir,
};
pub use matching::{
    BanglaStemmer, EnglishStemmer, NormalizedLevenshtein, PhoneticKeyer, Similarity, Soundex,
    SpellCorrector, Stemmer,
};
pub use text::{normalize, tokenize, Language};
