//! `mnemograph` — thin demonstration binary wiring the engine crates
//! together behind stub or HTTP providers (spec §10: "demonstration
//! plumbing, not a spec component"). Grounded on
//! `aigent-app/crates/interfaces/cli/src/main.rs`'s `clap` derive +
//! `tracing-subscriber` setup, sized down for a crate with no daemon or
//! TUI of its own.

mod provider_wiring;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mnemograph_consolidation::ConsolidationDeps;
use mnemograph_core::config::MnemoConfig;
use mnemograph_core::ids::{SourceId, UserId};
use mnemograph_ingest::IngestDeps;
use mnemograph_retrieval::{RetrievalDeps, RetrieveOptions};
use mnemograph_scheduler::{PendingSource, Scheduler};
use mnemograph_storage::StorageEngine;

use provider_wiring::Providers;

#[derive(Debug, Parser)]
#[command(name = "mnemograph", version, about = "Associative memory graph engine — local exerciser")]
struct Cli {
    /// Path to a SQLite database file; defaults to an in-memory store that
    /// vanishes when the process exits.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Path to a TOML config overriding the spec-default tunables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use real HTTP embedding/LLM providers configured via
    /// `MNEMOGRAPH_EMBEDDING_*` / `MNEMOGRAPH_LLM_*` env vars, instead of
    /// the deterministic in-process stubs.
    #[arg(long, global = true)]
    live: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ingest one journal entry for a user.
    Ingest {
        #[arg(long)]
        user: String,
        #[arg(long)]
        source_id: String,
        /// Entry text, or `@path` to read it from a file.
        #[arg(long)]
        text: String,
        /// Entry date (`YYYY-MM-DD`); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Run one consolidation pass for a user.
    Consolidate {
        #[arg(long)]
        user: String,
        /// Consolidation date (`YYYY-MM-DD`); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Run spreading-activation retrieval for a user.
    Retrieve {
        #[arg(long)]
        user: String,
        #[arg(long)]
        query: String,
        #[arg(long)]
        max_memories: Option<usize>,
        #[arg(long)]
        max_hops: Option<usize>,
    },
    /// Print a user's digest for a date, if one has been run.
    Digest {
        #[arg(long)]
        user: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn read_text(raw: &str) -> Result<String> {
    match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path}")),
        None => Ok(raw.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mnemograph=info".parse()?))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MnemoConfig::from_toml_file(path).map_err(|e| anyhow::anyhow!(e.to_string()))?,
        None => MnemoConfig::default(),
    };

    let storage = Arc::new(match &cli.db {
        Some(path) => StorageEngine::open(path).map_err(|e| anyhow::anyhow!(e.to_string()))?,
        None => StorageEngine::open_in_memory().map_err(|e| anyhow::anyhow!(e.to_string()))?,
    });

    let providers = if cli.live {
        Providers::from_env()?
    } else {
        Providers::stub()
    };

    match cli.command {
        Commands::Ingest { user, source_id, text, date } => {
            let text = read_text(&text)?;
            let user_id = UserId::from_raw(user);
            let now = Utc::now();
            let entry_date = date.unwrap_or_else(|| now.date_naive());

            let ingest_deps = IngestDeps {
                embeddings: providers.embeddings.clone(),
                llm: providers.llm.clone(),
                vector_store: storage.clone(),
            };
            let consolidation_deps = ConsolidationDeps {
                llm: providers.llm.clone(),
                embeddings: providers.embeddings.clone(),
                vector_store: storage.clone(),
                graph_store: storage.clone(),
                implication_store: storage.clone(),
            };
            let scheduler = Scheduler::new(
                storage.clone(),
                ingest_deps,
                consolidation_deps,
                config.ingest.clone(),
                config.consolidation.clone(),
            );

            let sources = vec![PendingSource {
                source_id: SourceId::new(source_id),
                text,
                entry_date,
                contacts_snapshot: Vec::new(),
                explicit_mentions: Vec::new(),
            }];
            let summary = scheduler
                .schedule_ingest(user_id, sources, now)
                .await
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            println!(
                "ingested: {} created, {} reinforced, {} deferred",
                summary.created, summary.reinforced, summary.deferred
            );
        }
        Commands::Consolidate { user, date } => {
            let user_id = UserId::from_raw(user);
            let now = Utc::now();
            let date = date.unwrap_or_else(|| now.date_naive());

            let ingest_deps = IngestDeps {
                embeddings: providers.embeddings.clone(),
                llm: providers.llm.clone(),
                vector_store: storage.clone(),
            };
            let consolidation_deps = ConsolidationDeps {
                llm: providers.llm.clone(),
                embeddings: providers.embeddings.clone(),
                vector_store: storage.clone(),
                graph_store: storage.clone(),
                implication_store: storage.clone(),
            };
            let scheduler = Scheduler::new(
                storage.clone(),
                ingest_deps,
                consolidation_deps,
                config.ingest.clone(),
                config.consolidation.clone(),
            );

            let digest = scheduler
                .schedule_consolidation(user_id, date, Vec::new(), now)
                .await
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            println!("{}", digest.summary);
        }
        Commands::Retrieve { user, query, max_memories, max_hops } => {
            let user_id = UserId::from_raw(user);
            let deps = RetrievalDeps {
                embeddings: providers.embeddings.clone(),
                vector_store: storage.clone(),
                graph_store: storage.clone(),
                implication_store: storage.clone(),
            };
            let mut opts = RetrieveOptions::from_config(&config.retrieval);
            if let Some(n) = max_memories {
                opts.max_memories = n;
            }
            if let Some(h) = max_hops {
                opts.max_hops = h;
            }

            let result = mnemograph_retrieval::retrieve(&deps, &config.retrieval, &user_id, &query, &opts, Utc::now())
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;

            for activated in &result.memories {
                println!(
                    "[hop {:>2}] {:.3}  {}",
                    activated.hop, activated.activation, activated.memory.content
                );
            }
            println!("--- implications ---");
            for implication in &result.implications {
                println!("[{:.3}] {}", implication.relevance, implication.implication.content);
            }
        }
        Commands::Digest { user, date } => {
            let user_id = UserId::from_raw(user);
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            match storage.get_digest(&user_id, date).map_err(|e| anyhow::anyhow!(e.to_string()))? {
                Some(digest) => println!("{}", digest.summary),
                None => println!("no digest for {user_id} on {date}"),
            }
        }
    }

    Ok(())
}
