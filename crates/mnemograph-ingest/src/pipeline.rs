//! Memory ingest pipeline (C4, spec §4.4).

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use tracing::{info, warn};

use mnemograph_core::errors::{IngestError, MnemoResult};
use mnemograph_core::ids::{SourceId, UserId};
use mnemograph_core::memory::Memory;
use mnemograph_core::sync_state::SyncState;
use mnemograph_core::traits::ExtractRequest;

use crate::abstract_embedder;
use crate::contact_resolution::{resolve_contacts, ContactRecord, ExplicitMention};
use crate::deps::IngestDeps;
use mnemograph_core::config::IngestConfig;

/// Result of one `ingest` call (spec §4.4: `(created, reinforced,
/// remaining_estimate)`).
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOutcome {
    pub created: usize,
    pub reinforced: usize,
    /// `remaining_hint` minus one if this call advanced `SyncState`, else
    /// unchanged — a caller-supplied count of sources left in the current
    /// run, since ingest itself has no visibility into the scheduler's
    /// overall queue (spec §4.4 leaves the exact accounting unspecified;
    /// this is the resolution recorded in the design ledger).
    pub remaining_estimate: usize,
}

enum ItemOutcome {
    Created(Memory),
    Reinforced,
    Failed,
}

/// Run one ingest cycle for a single journal entry.
///
/// `sync_state` is mutated in place (step 1 checks it, step 7 advances it);
/// the caller is responsible for loading it before the call and persisting
/// it after, since this pipeline operates purely over the provider/store
/// traits and has no storage-engine-specific bookkeeping of its own.
#[allow(clippy::too_many_arguments)]
pub fn ingest(
    deps: &IngestDeps,
    config: &IngestConfig,
    user_id: &UserId,
    source_id: SourceId,
    text: &str,
    entry_date: NaiveDate,
    contacts_snapshot: &[ContactRecord],
    explicit_mentions: &[ExplicitMention],
    sync_state: &mut SyncState,
    remaining_hint: usize,
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
) -> MnemoResult<IngestOutcome> {
    // Step 1.
    if sync_state.is_processed(&source_id) {
        return Ok(IngestOutcome { remaining_estimate: remaining_hint, ..Default::default() });
    }

    let trimmed = text.trim();
    // Step 2.
    if trimmed.len() < config.min_text_len {
        sync_state.mark_processed(source_id, now);
        return Ok(IngestOutcome { remaining_estimate: remaining_hint.saturating_sub(1) });
    }

    // Step 3.
    let snapshot_names: Vec<String> = contacts_snapshot.iter().map(|c| c.name.clone()).collect();
    let extracted = deps.llm.extract(ExtractRequest {
        entry_text: trimmed,
        entry_date,
        contact_names: &snapshot_names,
    })?;
    if extracted.is_empty() {
        sync_state.mark_processed(source_id, now);
        return Ok(IngestOutcome { remaining_estimate: remaining_hint.saturating_sub(1) });
    }

    // Step 4.
    let slack = deadline.signed_duration_since(now).num_seconds();
    if slack < config.post_extract_min_slack_secs as i64 {
        return Err(IngestError::InsufficientSlack {
            remaining_ms: slack.max(0) as u64 * 1000,
            needed_ms: config.post_extract_min_slack_secs * 1000,
        }
        .into());
    }

    // Step 5.
    let contents: Vec<String> = extracted.iter().map(|m| m.content.clone()).collect();
    let embeddings = deps.embeddings.embed_batch(&contents)?;

    // Step 6: bounded concurrency of `batch_size` (spec §5 "batches of 5").
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.batch_size.max(1))
        .build()
        .map_err(|e| IngestError::Llm(mnemograph_core::errors::LlmError::ProviderUnavailable {
            reason: e.to_string(),
        }))?;

    let outcomes: Vec<ItemOutcome> = pool.install(|| {
        extracted
            .par_iter()
            .zip(embeddings.par_iter())
            .map(|(extracted_memory, embedding)| {
                process_one(
                    deps,
                    config,
                    user_id,
                    extracted_memory,
                    embedding,
                    contacts_snapshot,
                    explicit_mentions,
                    entry_date,
                    now,
                )
            })
            .collect()
    });

    let mut created = 0usize;
    let mut reinforced = 0usize;
    for outcome in outcomes {
        match outcome {
            ItemOutcome::Created(memory) => {
                created += 1;
                let deps = deps.clone();
                let memory_id = memory.id.clone();
                let content = memory.content.clone();
                rayon::spawn(move || abstract_embedder::backfill(&deps, &memory_id, &content));
            }
            ItemOutcome::Reinforced => reinforced += 1,
            ItemOutcome::Failed => {}
        }
    }

    // Step 7: only advance SyncState if extraction was non-empty AND at
    // least one memory actually succeeded (spec §4.4 failure semantics).
    if created > 0 || reinforced > 0 {
        sync_state.mark_processed(source_id, now);
        info!(user_id = %user_id, created, reinforced, "ingest cycle committed");
        Ok(IngestOutcome { created, reinforced, remaining_estimate: remaining_hint.saturating_sub(1) })
    } else {
        warn!(user_id = %user_id, "ingest cycle produced no successes, leaving source unprocessed");
        Ok(IngestOutcome { created: 0, reinforced: 0, remaining_estimate: remaining_hint })
    }
}

#[allow(clippy::too_many_arguments)]
fn process_one(
    deps: &IngestDeps,
    config: &IngestConfig,
    user_id: &UserId,
    extracted: &mnemograph_core::traits::ExtractedMemory,
    embedding: &[f32],
    contacts_snapshot: &[ContactRecord],
    explicit_mentions: &[ExplicitMention],
    entry_date: NaiveDate,
    now: DateTime<Utc>,
) -> ItemOutcome {
    let top = match deps.vector_store.knn_by_embedding(user_id, embedding, 1, 0.0) {
        Ok(hits) => hits.into_iter().next(),
        Err(e) => {
            warn!(error = %e, "dedup lookup failed, skipping memory");
            return ItemOutcome::Failed;
        }
    };

    if let Some(top) = &top {
        if top.similarity > config.sim_dedup {
            return match deps.vector_store.reinforce(&top.memory.id, 0.05, 1, now) {
                Ok(()) => ItemOutcome::Reinforced,
                Err(e) => {
                    warn!(error = %e, "reinforce failed, skipping memory");
                    ItemOutcome::Failed
                }
            };
        }
    }

    let contact_ids = resolve_contacts(
        &extracted.content,
        &extracted.contact_names,
        contacts_snapshot,
        explicit_mentions,
    );

    let memory = Memory::new(
        user_id.clone(),
        extracted.content.clone(),
        "journal".to_string(),
        entry_date,
        contact_ids,
        extracted.significance,
        now,
    )
    .with_embedding(embedding.to_vec());

    match deps.vector_store.insert_memory(&memory) {
        Ok(()) => ItemOutcome::Created(memory),
        Err(e) => {
            warn!(error = %e, "insert failed, skipping memory");
            ItemOutcome::Failed
        }
    }
}
