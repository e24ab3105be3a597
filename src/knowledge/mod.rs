//! Knowledge module - the store and the reply pipeline over it
//!
//! - Store: SQLite-backed question/answer mappings (per language + learned overlay)
//! - Reply: ordered fallback matching (exact -> fuzzy -> phonetic -> stemmed)
//!   and the teach/learn handler

mod reply;
mod store;

// Re-exports
pub use reply::{
    default_reply, EngineConfig, EngineError, LearnMode, LearnRequest, LearnResponse,
    MatchResult, MatchStrategy, ReplyEngine, ReplyRequest, ReplyResponse, ValidationError,
};
pub use store::{get_data_dir, Entry, KnowledgeStore, Mapping, StoreError, StoreStats};
