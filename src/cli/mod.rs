//! CLI module
//!
//! Command definitions and implementations for the `bondhu` binary. This is
//! the only in-tree consumer of the engine; a network listener would sit in
//! the same position, decoding `ReplyRequest`/`LearnRequest` payloads.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::knowledge::{
    get_data_dir, EngineConfig, EngineError, KnowledgeStore, LearnMode, LearnRequest, Mapping,
    ReplyEngine, ReplyRequest,
};
use crate::text::Language;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "bondhu")]
#[command(version, about = "Bangla/English FAQ chatbot engine", long_about = None)]
pub struct Cli {
    /// Knowledge database path (default: ~/.bondhu/knowledge.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question and print the reply
    Ask {
        /// The message to answer
        message: String,

        /// Language of the message
        #[arg(short, long, default_value = "bangla")]
        lang: String,

        /// Fuzzy acceptance threshold (a match needs a strictly higher score)
        #[arg(long, default_value = "0.5")]
        threshold: f64,

        /// Disable the English spelling pre-pass
        #[arg(long)]
        no_spelling: bool,
    },

    /// Teach a new question/answer pair
    Teach {
        /// The question
        question: String,

        /// The answer
        answer: String,

        /// Language of the pair (omit for the shared learned overlay)
        #[arg(short, long)]
        lang: Option<String>,

        /// Write tagged pairs into the language base instead of the overlay
        #[arg(long)]
        merge_into_base: bool,
    },

    /// Import a flat {question: answer} JSON file into a mapping
    Import {
        /// JSON file to import
        file: PathBuf,

        /// Target mapping: "bangla", "english" or "learned"
        #[arg(short, long)]
        lang: String,
    },

    /// Export a mapping as flat JSON
    Export {
        /// Source mapping: "bangla", "english" or "learned"
        #[arg(short, long)]
        lang: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List stored pairs in a mapping
    List {
        /// Mapping: "bangla", "english" or "learned"
        #[arg(short, long, default_value = "learned")]
        lang: String,

        /// Result limit
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show store status
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// Execute a parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    let store = open_store(cli.db)?;

    match cli.command {
        Commands::Ask {
            message,
            lang,
            threshold,
            no_spelling,
        } => cmd_ask(store, &message, &lang, threshold, no_spelling).await,
        Commands::Teach {
            question,
            answer,
            lang,
            merge_into_base,
        } => cmd_teach(store, &question, &answer, lang, merge_into_base).await,
        Commands::Import { file, lang } => cmd_import(store, &file, &lang),
        Commands::Export { lang, out } => cmd_export(store, &lang, out),
        Commands::List { lang, limit } => cmd_list(store, &lang, limit),
        Commands::Status => cmd_status(store),
    }
}

fn open_store(db: Option<PathBuf>) -> Result<KnowledgeStore> {
    let store = match db {
        Some(path) => KnowledgeStore::open(&path),
        None => KnowledgeStore::open_default(),
    };
    store.context("Failed to open knowledge store")
}

/// Parse a mapping selector ("bangla" / "english" / "learned").
fn parse_mapping(tag: &str) -> Result<Mapping> {
    if tag.eq_ignore_ascii_case("learned") {
        return Ok(Mapping::Learned);
    }
    let language: Language = tag
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown mapping '{tag}', expected bangla, english or learned"))?;
    Ok(Mapping::Base(language))
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Ask command: run one message through the reply pipeline.
async fn cmd_ask(
    store: KnowledgeStore,
    message: &str,
    lang: &str,
    threshold: f64,
    no_spelling: bool,
) -> Result<()> {
    let config = EngineConfig {
        similarity_threshold: threshold,
        spelling_correction: !no_spelling,
        ..EngineConfig::default()
    };
    let engine =
        ReplyEngine::with_config(store, config).context("Failed to build reply engine")?;

    let request = ReplyRequest {
        message: message.to_string(),
        lang: lang.to_string(),
    };

    match engine.reply(&request).await {
        Ok(response) => {
            println!("{}", response.reply);
            Ok(())
        }
        Err(e) if e.is_client_error() => bail!("invalid request: {e}"),
        Err(e) => Err(e).context("Reply failed"),
    }
}

/// Teach command: validate and persist a new pair.
async fn cmd_teach(
    store: KnowledgeStore,
    question: &str,
    answer: &str,
    lang: Option<String>,
    merge_into_base: bool,
) -> Result<()> {
    let config = EngineConfig {
        // Teaching never consults the dictionary; skip loading it.
        spelling_correction: false,
        learn_mode: if merge_into_base {
            LearnMode::MergeIntoBase
        } else {
            LearnMode::SeparateOverlay
        },
        ..EngineConfig::default()
    };
    let engine =
        ReplyEngine::with_config(store, config).context("Failed to build reply engine")?;

    let request = LearnRequest {
        question: question.to_string(),
        answer: answer.to_string(),
        lang,
    };

    match engine.learn(&request).await {
        Ok(response) => {
            println!("[OK] {}", response.message);
            Ok(())
        }
        Err(e @ EngineError::Validation(_)) => bail!("invalid request: {e}"),
        Err(e) => Err(e).context("Teach failed"),
    }
}

/// Import command: load a seed JSON file into one mapping.
fn cmd_import(store: KnowledgeStore, file: &PathBuf, lang: &str) -> Result<()> {
    let mapping = parse_mapping(lang)?;

    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    println!("[*] Importing {} into '{}'...", file.display(), mapping.key());

    let imported = store
        .import_json(mapping, &json)
        .context("Import failed")?;

    println!("[OK] Imported {} pairs", imported);
    Ok(())
}

/// Export command: dump one mapping as flat JSON.
fn cmd_export(store: KnowledgeStore, lang: &str, out: Option<PathBuf>) -> Result<()> {
    let mapping = parse_mapping(lang)?;
    let json = store.export_json(mapping).context("Export failed")?;

    match out {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("[OK] Exported '{}' to {}", mapping.key(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// List command: show stored pairs, newest first.
fn cmd_list(store: KnowledgeStore, lang: &str, limit: usize) -> Result<()> {
    let mapping = parse_mapping(lang)?;
    let entries = store.entries(mapping, limit).context("Listing failed")?;

    if entries.is_empty() {
        println!("[!] No pairs stored in '{}'", mapping.key());
        return Ok(());
    }

    println!("[OK] Pairs in '{}' ({} shown):\n", mapping.key(), entries.len());
    for entry in entries {
        println!("  Q: {}", entry.question);
        println!("  A: {}", truncate_text(&entry.answer, 80));
        println!("     {}", entry.created_at.format("%Y-%m-%d %H:%M"));
        println!();
    }
    Ok(())
}

/// Status command: store location and per-mapping counts.
fn cmd_status(store: KnowledgeStore) -> Result<()> {
    println!("bondhu v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("[*] Data directory: {}", get_data_dir().display());

    let stats = store.stats().context("Stats failed")?;
    println!("[OK] Database: {}", stats.db_path.display());
    println!("     bangla:  {} pairs", stats.bangla);
    println!("     english: {} pairs", stats.english);
    println!("     learned: {} pairs", stats.learned);
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Truncate text for display (UTF-8 safe).
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

// ============================================================================
// Tests
// ============================================================================
