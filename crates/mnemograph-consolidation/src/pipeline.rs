//! Three-stage per-cluster LLM pipeline (spec §4.8): discover connections,
//! synthesize an implication, then score it through the quality gate.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use mnemograph_core::connection::Connection;
use mnemograph_core::digest::{Digest, DigestSnippetKind};
use mnemograph_core::errors::MnemoResult;
use mnemograph_core::ids::{ContactId, MemoryId, UserId};
use mnemograph_core::implication::Implication;
use mnemograph_core::memory::Memory;
use mnemograph_core::traits::{
    DiscoverConnectionsRequest, ScoreRequest, SynthesizeImplicationRequest,
};

use crate::clustering::Cluster;
use crate::deps::ConsolidationDeps;
use mnemograph_core::config::ConsolidationConfig;

const MIN_REASON_LEN: usize = 10;
const MIN_IMPLICATION_CONTENT_LEN: usize = 20;
const MAX_CONNECTIONS_PER_CLUSTER: usize = 4;

/// Run the three-stage pipeline for one cluster and fold its effects into
/// `digest`.
pub fn process_cluster(
    deps: &ConsolidationDeps,
    config: &ConsolidationConfig,
    user_id: &UserId,
    cluster: &Cluster,
    memories_by_id: &HashMap<MemoryId, Memory>,
    contacts_snapshot: &[(ContactId, String)],
    embed: impl Fn(&str) -> MnemoResult<Vec<f32>>,
    now: DateTime<Utc>,
    digest: &mut Digest,
) {
    let member_set: BTreeSet<MemoryId> = cluster.member_ids.iter().cloned().collect();
    let cluster_contents: Vec<(MemoryId, String)> = cluster
        .member_ids
        .iter()
        .filter_map(|id| memories_by_id.get(id).map(|m| (id.clone(), m.content.clone())))
        .collect();

    let cluster_contact_ids: BTreeSet<ContactId> = cluster
        .member_ids
        .iter()
        .filter_map(|id| memories_by_id.get(id))
        .flat_map(|m| m.contact_ids.iter().cloned())
        .collect();
    let contacts: Vec<(ContactId, String)> = contacts_snapshot
        .iter()
        .filter(|(id, _)| cluster_contact_ids.contains(id))
        .cloned()
        .collect();

    // Stage 1: discover connections.
    let proposed = match deps.llm.discover_connections(DiscoverConnectionsRequest {
        cluster_contents: &cluster_contents,
        contacts: &contacts,
        anti_cluster: cluster.anti_cluster,
    }) {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(error = %e, "discover_connections failed, skipping cluster connections");
            Vec::new()
        }
    };

    let mut connections = Vec::new();
    for candidate in proposed.into_iter().take(MAX_CONNECTIONS_PER_CLUSTER) {
        if !member_set.contains(&candidate.memory_a_id) || !member_set.contains(&candidate.memory_b_id) {
            continue;
        }
        if candidate.reason.len() < MIN_REASON_LEN {
            continue;
        }
        let Some((lo, hi)) = Connection::normalize_pair(candidate.memory_a_id.clone(), candidate.memory_b_id.clone()) else {
            continue;
        };
        let connection = Connection {
            memory_a_id: lo,
            memory_b_id: hi,
            connection_type: candidate.connection_type,
            weight: Connection::INITIAL_WEIGHT,
            reason: candidate.reason,
            created_at: now,
            last_coactivated_at: now,
        };
        match deps.graph_store.upsert_connection(&connection, config.hebbian_delta_consolidate, now) {
            Ok(true) => {
                digest.counts.connections_created += 1;
                digest.push_snippet(
                    DigestSnippetKind::ConnectionCreated,
                    format!("{} <-> {}: {}", connection.memory_a_id, connection.memory_b_id, connection.reason),
                );
                connections.push(candidate_summary(&connection));
            }
            Ok(false) => {
                digest.counts.connections_strengthened += 1;
                if let Err(e) = deps.vector_store.bulk_reinforce(
                    &[(connection.memory_a_id.clone(), 0.0, 1), (connection.memory_b_id.clone(), 0.0, 1)],
                    now,
                ) {
                    warn!(error = %e, "bulk_bump after connection strengthen failed");
                }
                digest.push_snippet(
                    DigestSnippetKind::ConnectionStrengthened,
                    format!("{} <-> {}: {}", connection.memory_a_id, connection.memory_b_id, connection.reason),
                );
                connections.push(candidate_summary(&connection));
            }
            Err(e) => warn!(error = %e, "upsert_connection failed"),
        }
    }

    // Stage 2: synthesize an implication.
    let candidate_connections: Vec<_> = connections;
    let discovered = match deps.llm.synthesize_implication(SynthesizeImplicationRequest {
        cluster_contents: &cluster_contents,
        connections: &candidate_connections,
        contacts: &contacts,
        anti_cluster: cluster.anti_cluster,
    }) {
        Ok(candidate) => candidate,
        Err(e) => {
            warn!(error = %e, "synthesize_implication failed, skipping cluster implication");
            None
        }
    };

    let Some(candidate) = discovered else { return };
    if candidate.content.len() < MIN_IMPLICATION_CONTENT_LEN {
        return;
    }
    if candidate.source_memory_ids.intersection(&member_set).next().is_none() {
        return;
    }

    // Stage 3: quality gate.
    let source_contents: Vec<String> = candidate
        .source_memory_ids
        .iter()
        .filter_map(|id| memories_by_id.get(id).map(|m| m.content.clone()))
        .collect();
    let passes = match deps.llm.score(ScoreRequest {
        implication_content: &candidate.content,
        source_contents: &source_contents,
    }) {
        Ok(score) => score >= config.quality_threshold,
        Err(e) => {
            // Fail-open: non-numeric/unparseable quality output passes through.
            if config.quality_fail_open {
                info!(error = %e, "quality gate failed to parse, failing open");
                true
            } else {
                false
            }
        }
    };

    if !passes {
        digest.counts.implications_filtered += 1;
        digest.push_snippet(DigestSnippetKind::ImplicationFiltered, candidate.content.clone());
        return;
    }

    let embedding = match embed(&candidate.content) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "embedding implication content failed, dropping candidate");
            return;
        }
    };

    let implication = Implication::new(
        user_id.clone(),
        candidate.content.clone(),
        embedding,
        candidate.implication_type,
        candidate.implication_order,
        candidate.source_memory_ids,
        now,
    );

    match deps.implication_store.insert_or_reinforce(&implication, now) {
        Ok((_, true)) => {
            digest.counts.implications_created += 1;
            digest.push_snippet(DigestSnippetKind::ImplicationCreated, candidate.content);
        }
        Ok((_, false)) => {
            digest.counts.implications_reinforced += 1;
            digest.push_snippet(DigestSnippetKind::ImplicationReinforced, candidate.content);
        }
        Err(e) => warn!(error = %e, "insert_or_reinforce failed"),
    }
}

fn candidate_summary(connection: &Connection) -> mnemograph_core::traits::ConnectionCandidate {
    mnemograph_core::traits::ConnectionCandidate {
        memory_a_id: connection.memory_a_id.clone(),
        memory_b_id: connection.memory_b_id.clone(),
        connection_type: connection.connection_type,
        reason: connection.reason.clone(),
    }
}
