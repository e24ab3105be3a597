//! Reply engine - the ordered fallback matching pipeline
//!
//! Composes the matchers into one pipeline over the knowledge store:
//!
//! ```text
//! normalize -> [spell-correct (english)] -> exact -> fuzzy -> phonetic -> stemmed -> default
//! ```
//!
//! The stage order encodes a confidence ranking from strict to permissive.
//! Every stage consults the same combined candidate set (language base plus
//! learned overlay, base answers winning on duplicate keys), and the first
//! stage to produce a match short-circuits the rest. Running out of stages
//! is the normal `NotFound` outcome, not an error.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matching::{
    best_match, default_keyer, default_similarity, first_key_match, first_stem_match,
    stemmer_for, PhoneticKeyer, Similarity, SpellCorrector,
};
use crate::text::{normalize, Language};

use super::store::{KnowledgeStore, Mapping, StoreError};

// ============================================================================
// Types
// ============================================================================

/// Which pipeline stage produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Fuzzy,
    Phonetic,
    Stemmed,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::Fuzzy => "fuzzy",
            MatchStrategy::Phonetic => "phonetic",
            MatchStrategy::Stemmed => "stemmed",
        }
    }
}

/// Outcome of running the pipeline for one query.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// A stage matched `question` and produced its stored `answer`.
    Found {
        question: String,
        answer: String,
        strategy: MatchStrategy,
    },
    /// No stage matched; the caller substitutes the default reply.
    NotFound,
}

/// Where runtime-taught pairs are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LearnMode {
    /// Taught pairs go to the shared learned overlay.
    #[default]
    SeparateOverlay,
    /// Taught pairs with a supported language tag go straight into that
    /// language's base mapping; untagged pairs still go to the overlay.
    MergeIntoBase,
}

/// Pipeline tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fuzzy stage accepts only scores strictly above this.
    pub similarity_threshold: f64,
    /// Enable the English spelling pre-pass.
    pub spelling_correction: bool,
    /// Placement policy for taught pairs.
    pub learn_mode: LearnMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.5,
            spelling_correction: true,
            learn_mode: LearnMode::default(),
        }
    }
}

/// Fixed reply for queries nothing matched.
pub fn default_reply(language: Language) -> &'static str {
    match language {
        Language::Bangla => "দুঃখিত, আমি এই মেসেজের উত্তর জানি না। 😔",
        Language::English => "Sorry, I don't know the answer to that yet.",
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// Inbound reply request, as the listener layer decodes it.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub lang: String,
}

/// Outbound reply payload.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyResponse {
    pub reply: String,
}

/// Inbound teach request.
#[derive(Debug, Clone, Deserialize)]
pub struct LearnRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub lang: Option<String>,
}

/// Outbound teach acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct LearnResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// Errors
// ============================================================================

/// Request rejected before touching the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("unknown language '{0}', expected \"bangla\" or \"english\"")]
    UnknownLanguage(String),
}

/// Engine failure, split so the listener layer can map client vs server
/// errors. The pipeline itself never fails; only validation and the store
/// can.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// True when the caller sent a bad request (as opposed to a server-side
    /// store failure).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_) | EngineError::Store(StoreError::InvalidInput)
        )
    }
}

// ============================================================================
// ReplyEngine
// ============================================================================

/// The matching orchestrator plus the teach/learn handler.
///
/// Owns the store handle and the algorithm seams; the concrete metric,
/// keyer and stemmers hide behind their traits so they can be swapped
/// without touching the pipeline.
pub struct ReplyEngine {
    store: KnowledgeStore,
    config: EngineConfig,
    similarity: Box<dyn Similarity>,
    keyer: Box<dyn PhoneticKeyer>,
    corrector: Option<SpellCorrector>,
}

impl ReplyEngine {
    /// Engine with default configuration.
    pub fn new(store: KnowledgeStore) -> Result<Self> {
        Self::with_config(store, EngineConfig::default())
    }

    /// Engine with explicit configuration.
    ///
    /// The spelling dictionary is loaded once here and shared read-only
    /// afterwards; when correction is disabled no dictionary is loaded.
    pub fn with_config(store: KnowledgeStore, config: EngineConfig) -> Result<Self> {
        let corrector = if config.spelling_correction {
            Some(SpellCorrector::builtin()?)
        } else {
            None
        };

        Ok(Self {
            store,
            config,
            similarity: default_similarity(),
            keyer: default_keyer(),
            corrector,
        })
    }

    /// Inner store handle.
    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Answer a wire request, substituting the default reply on `NotFound`.
    pub async fn reply(&self, request: &ReplyRequest) -> Result<ReplyResponse, EngineError> {
        if request.message.trim().is_empty() {
            return Err(ValidationError::MissingField("message").into());
        }
        let lang = request.lang.trim();
        if lang.is_empty() {
            return Err(ValidationError::MissingField("lang").into());
        }
        let language: Language = lang
            .parse()
            .map_err(|_| ValidationError::UnknownLanguage(lang.to_string()))?;

        let reply = match self.answer(language, &request.message).await? {
            MatchResult::Found { answer, .. } => answer,
            MatchResult::NotFound => default_reply(language).to_string(),
        };
        Ok(ReplyResponse { reply })
    }

    /// Run the fallback pipeline for one message.
    pub async fn answer(
        &self,
        language: Language,
        message: &str,
    ) -> Result<MatchResult, EngineError> {
        let query = normalize(message);
        if query.is_empty() {
            return Ok(MatchResult::NotFound);
        }

        // The corrected query is carried forward through every later stage,
        // so one fixed typo can still reach the phonetic and stemmed stages.
        let query = match (&self.corrector, language) {
            (Some(corrector), Language::English) => {
                let corrected = corrector.correct(&query);
                if corrected != query {
                    tracing::debug!(target: "bondhu::reply", %query, %corrected, "spelling corrected");
                }
                corrected
            }
            _ => query,
        };

        let candidates = self.candidates(language)?;
        let result = self.run_pipeline(language, &query, &candidates);

        match &result {
            MatchResult::Found { question, strategy, .. } => {
                tracing::info!(
                    target: "bondhu::reply",
                    lang = language.tag(),
                    %query,
                    matched = %question,
                    strategy = strategy.as_str(),
                    "matched"
                );
            }
            MatchResult::NotFound => {
                tracing::info!(target: "bondhu::reply", lang = language.tag(), %query, "no match");
            }
        }
        Ok(result)
    }

    /// Teach a new pair; durably persisted before this returns.
    pub async fn learn(&self, request: &LearnRequest) -> Result<LearnResponse, EngineError> {
        if request.question.trim().is_empty() {
            return Err(ValidationError::MissingField("question").into());
        }
        if request.answer.trim().is_empty() {
            return Err(ValidationError::MissingField("answer").into());
        }

        let language = request
            .lang
            .as_deref()
            .and_then(|tag| tag.parse::<Language>().ok());

        // Unsupported or absent language tags always land in the overlay;
        // merge-into-base only applies to a recognized language.
        let mapping = match (self.config.learn_mode, language) {
            (LearnMode::MergeIntoBase, Some(lang)) => Mapping::Base(lang),
            _ => Mapping::Learned,
        };

        self.store.merge(mapping, &request.question, &request.answer)?;

        let question = normalize(&request.question);
        tracing::info!(
            target: "bondhu::reply",
            mapping = mapping.key(),
            %question,
            "learned new pair"
        );
        Ok(LearnResponse {
            success: true,
            message: format!("Learned \"{question}\""),
        })
    }

    /// Combined candidate set for a language: base plus overlay, with the
    /// base answer winning wherever a key exists in both. Every pipeline
    /// stage sees this one map, so precedence holds identically at every
    /// stage.
    fn candidates(&self, language: Language) -> Result<BTreeMap<String, String>, StoreError> {
        let mut combined = self.store.load(Mapping::Learned)?;
        combined.extend(self.store.load(Mapping::Base(language))?);
        Ok(combined)
    }

    fn run_pipeline(
        &self,
        language: Language,
        query: &str,
        candidates: &BTreeMap<String, String>,
    ) -> MatchResult {
        // Stage 1: exact lookup on canonical text.
        if let Some(answer) = candidates.get(query) {
            return found(query, answer, MatchStrategy::Exact);
        }

        let keys = || candidates.keys().map(String::as_str);

        // Stage 2: fuzzy similarity, strict threshold.
        if let Some((question, score)) = best_match(self.similarity.as_ref(), query, keys()) {
            if score > self.config.similarity_threshold {
                return found(question, &candidates[question], MatchStrategy::Fuzzy);
            }
            tracing::debug!(
                target: "bondhu::reply",
                %question,
                score,
                threshold = self.config.similarity_threshold,
                "fuzzy candidate below threshold"
            );
        }

        // Stage 3: phonetic key equality.
        if let Some(question) = first_key_match(self.keyer.as_ref(), query, keys()) {
            return found(question, &candidates[question], MatchStrategy::Phonetic);
        }

        // Stage 4: stem-sequence equality.
        let stemmer = stemmer_for(language);
        if let Some(question) = first_stem_match(stemmer.as_ref(), query, keys()) {
            return found(question, &candidates[question], MatchStrategy::Stemmed);
        }

        MatchResult::NotFound
    }
}

fn found(question: &str, answer: &str, strategy: MatchStrategy) -> MatchResult {
    MatchResult::Found {
        question: question.to_string(),
        answer: answer.to_string(),
        strategy,
    }
}

// ============================================================================
// Tests
// ============================================================================
