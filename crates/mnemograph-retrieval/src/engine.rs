//! Spreading-activation retrieval (C9, spec §4.9). Embeds the query, seeds
//! from nearest neighbors, spreads activation outward across the
//! connection graph with hop decay, folds in implication-mediated
//! bridging, reranks for entity diversity, and reinforces whatever
//! survives.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use mnemograph_core::errors::{MnemoResult, RetrievalError};
use mnemograph_core::ids::{MemoryId, UserId};
use mnemograph_core::memory::Memory;

use crate::deps::RetrievalDeps;
use crate::effective_strength::effective_strength;
use crate::mmr::{self, MmrCandidate};
use crate::options::RetrieveOptions;
use crate::types::{ActivatedMemory, RetrievalResult, RetrievedConnection, RetrievedImplication};
use crate::working_graph::WorkingGraph;
use mnemograph_core::config::RetrievalConfig;

/// The memory on the other end of `connection` from `from`.
fn other_side(connection: &mnemograph_core::connection::Connection, from: &MemoryId) -> MemoryId {
    if &connection.memory_a_id == from {
        connection.memory_b_id.clone()
    } else {
        connection.memory_a_id.clone()
    }
}

fn by_activation_desc(a: &ActivatedMemory, b: &ActivatedMemory) -> Ordering {
    b.activation.partial_cmp(&a.activation).unwrap_or(Ordering::Equal)
}

/// Effective strength of `memory`, gating against `min_strength`. `Ok(None)`
/// means the memory decayed below the floor and should be dropped.
fn gated_effective_strength(
    deps: &RetrievalDeps,
    config: &RetrievalConfig,
    memory: &Memory,
    now: DateTime<Utc>,
    min_strength: f64,
) -> MnemoResult<Option<f64>> {
    let connection_count = deps.graph_store.neighbors(&memory.id)?.len();
    let eff = effective_strength(
        memory,
        connection_count,
        now,
        config.half_life_connected_days,
        config.half_life_isolated_days,
    );
    Ok(if eff < min_strength { None } else { Some(eff) })
}

pub fn retrieve(
    deps: &RetrievalDeps,
    config: &RetrievalConfig,
    user_id: &UserId,
    query_text: &str,
    opts: &RetrieveOptions,
    now: DateTime<Utc>,
) -> MnemoResult<RetrievalResult> {
    // Step 1: embed the query.
    let query_vec = deps.embeddings.embed(query_text)?;

    // Step 2: seed via nearest neighbors, then apply the contact filter
    // client-side (the store's kNN has no notion of contacts).
    let seeds = deps
        .vector_store
        .knn_by_embedding(user_id, &query_vec, config.seed_count, 0.0)?;
    let seeds: Vec<_> = seeds
        .into_iter()
        .filter(|s| {
            opts.contact_filter
                .as_ref()
                .map_or(true, |cid| s.memory.contact_ids.contains(cid))
        })
        .collect();
    if seeds.is_empty() {
        return Err(RetrievalError::NoSeeds.into());
    }

    // Steps 3-4: seed activation = similarity * effective strength, hop 0.
    let mut activated: HashMap<MemoryId, ActivatedMemory> = HashMap::new();
    for seed in &seeds {
        let Some(eff) = gated_effective_strength(deps, config, &seed.memory, now, opts.min_strength)? else {
            continue;
        };
        activated.insert(
            seed.memory.id.clone(),
            ActivatedMemory {
                memory: seed.memory.clone(),
                activation: seed.similarity * eff,
                hop: 0,
                via_implication: None,
            },
        );
    }
    if activated.is_empty() {
        return Err(RetrievalError::NoSeeds.into());
    }

    let mut working_graph = WorkingGraph::new();

    // Step 5: hop loop with (0.5)^h decay per spec §4.9; `propagated` reads
    // the source's already-decayed activation from the previous round and
    // applies a further `hop_discount^h` on top, exactly as written.
    let mut frontier: Vec<MemoryId> = activated.keys().cloned().collect();
    for h in 1..=opts.max_hops {
        let discount = config.hop_discount.powi(h as i32);
        let mut next_frontier = Vec::new();
        for source_id in &frontier {
            let source_activation = activated.get(source_id).map(|a| a.activation).unwrap_or(0.0);
            let neighbors = deps.graph_store.neighbors(source_id)?;
            for conn in &neighbors {
                let neighbor_id = other_side(conn, source_id);
                if activated.contains_key(&neighbor_id) {
                    continue;
                }
                let propagated = source_activation * conn.weight * discount;
                if propagated < 0.01 {
                    continue;
                }
                let Some(neighbor) = deps.vector_store.get(&neighbor_id)? else {
                    continue;
                };
                if let Some(cid) = &opts.contact_filter {
                    if !neighbor.contact_ids.contains(cid) {
                        continue;
                    }
                }
                if gated_effective_strength(deps, config, &neighbor, now, opts.min_strength)?.is_none() {
                    continue;
                }
                working_graph.record_edge(conn);
                activated.insert(
                    neighbor_id.clone(),
                    ActivatedMemory {
                        memory: neighbor,
                        activation: propagated,
                        hop: h as i32,
                        via_implication: None,
                    },
                );
                next_frontier.push(neighbor_id);
            }
        }
        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
    }

    // Step 6: rank, keep the top `max_memories`. This is set A.
    let mut combined: Vec<ActivatedMemory> = activated.into_values().collect();
    combined.sort_by(by_activation_desc);
    combined.truncate(opts.max_memories);
    let a_ids: BTreeSet<MemoryId> = combined.iter().map(|m| m.memory.id.clone()).collect();

    // Step 7: implications whose sources overlap A, ranked by
    // relevance * strength, top 10.
    let mut implications: Vec<RetrievedImplication> = deps
        .implication_store
        .list_by_source_overlap(user_id, &a_ids)?
        .into_iter()
        .map(|implication| {
            let relevance = implication.relevance(&a_ids);
            RetrievedImplication { implication, relevance }
        })
        .collect();
    implications.sort_by(|x, y| {
        let sx = x.relevance * x.implication.strength;
        let sy = y.relevance * y.implication.strength;
        sy.partial_cmp(&sx).unwrap_or(Ordering::Equal)
    });
    implications.truncate(10);

    // Step 8: implication-mediated bridging. Each bridging implication that
    // surfaces at least one memory outside A contributes its outside
    // sources at a steep discount, capped at `max_bridging_implications`
    // contributing implications.
    let bridging = deps
        .implication_store
        .knn_by_embedding(user_id, &query_vec, config.bridging_impl_threshold)?;
    let mut bridged_count = 0usize;
    for scored in bridging {
        if bridged_count >= config.max_bridging_implications {
            break;
        }
        let outside: Vec<MemoryId> = scored
            .implication
            .source_memory_ids
            .iter()
            .filter(|id| !a_ids.contains(*id))
            .cloned()
            .collect();
        if outside.is_empty() {
            continue;
        }
        let mut any_added = false;
        for id in &outside {
            if combined.iter().any(|m| m.memory.id == *id) {
                continue;
            }
            let Some(mem) = deps.vector_store.get(id)? else {
                continue;
            };
            if let Some(cid) = &opts.contact_filter {
                if !mem.contact_ids.contains(cid) {
                    continue;
                }
            }
            let Some(eff) = gated_effective_strength(deps, config, &mem, now, opts.min_strength)? else {
                continue;
            };
            combined.push(ActivatedMemory {
                activation: scored.similarity * eff * 0.3,
                hop: -1,
                via_implication: Some(scored.implication.id.clone()),
                memory: mem,
            });
            any_added = true;
        }
        if any_added {
            bridged_count += 1;
            if !implications.iter().any(|ri| ri.implication.id == scored.implication.id) {
                let relevance = scored.implication.relevance(&a_ids);
                implications.push(RetrievedImplication {
                    implication: scored.implication,
                    relevance,
                });
            }
        }
    }

    // Step 9: entity-diversity reranking, skipped under a contact filter or
    // when the caller opted out.
    let final_memories: Vec<ActivatedMemory> = if opts.should_diversify() {
        let candidates: Vec<MmrCandidate> = combined
            .iter()
            .enumerate()
            .map(|(index, m)| MmrCandidate {
                index,
                activation: m.activation,
                entity_ids: m.memory.contact_ids.clone(),
            })
            .collect();
        let order = mmr::diversify(
            candidates,
            opts.max_memories,
            config.mmr_overrep,
            config.mmr_max_per_entity,
            config.mmr_diversity_weight,
        );
        order.into_iter().map(|i| combined[i].clone()).collect()
    } else {
        combined.sort_by(by_activation_desc);
        combined.truncate(opts.max_memories);
        combined
    };

    if opts.should_diversify() {
        implications = diversify_implications(deps, &implications, config)?;
    }

    let retained_ids: BTreeSet<MemoryId> = final_memories.iter().map(|m| m.memory.id.clone()).collect();
    let traversed = working_graph.edges_among(&retained_ids);

    // Step 10: Hebbian updates on the retained, traversed subgraph.
    if !opts.skip_hebbian && retained_ids.len() >= 2 {
        for (a, b, connection_type, _weight) in &traversed {
            deps.graph_store
                .strengthen(a, b, *connection_type, config.hebbian_delta_retrieve, now)?;
        }
        let bulk: Vec<(MemoryId, f64, u64)> = retained_ids.iter().map(|id| (id.clone(), 0.0, 1)).collect();
        deps.vector_store.bulk_reinforce(&bulk, now)?;
    }

    // Step 11: return memories, implications, and the surviving connections.
    let connections = traversed
        .into_iter()
        .map(|(memory_a_id, memory_b_id, connection_type, weight)| RetrievedConnection {
            memory_a_id,
            memory_b_id,
            connection_type,
            weight,
        })
        .collect();

    Ok(RetrievalResult {
        memories: final_memories,
        implications,
        connections,
    })
}

/// MMR over the implication list using the union of each implication's
/// source memories' contact ids as its entity signature (spec §4.9 step 9,
/// applied identically to implications). Reorders within the existing
/// top-10 cut rather than widening it — the spec names no separate target
/// count for implications.
fn diversify_implications(
    deps: &RetrievalDeps,
    implications: &[RetrievedImplication],
    config: &RetrievalConfig,
) -> MnemoResult<Vec<RetrievedImplication>> {
    if implications.is_empty() {
        return Ok(Vec::new());
    }
    let mut candidates = Vec::with_capacity(implications.len());
    for (index, ri) in implications.iter().enumerate() {
        let source_ids: Vec<MemoryId> = ri.implication.source_memory_ids.iter().cloned().collect();
        let sources = deps.vector_store.get_bulk(&source_ids)?;
        let entity_ids = sources.into_iter().flat_map(|m| m.contact_ids).collect();
        candidates.push(MmrCandidate {
            index,
            activation: ri.relevance * ri.implication.strength,
            entity_ids,
        });
    }
    let order = mmr::diversify(
        candidates,
        implications.len(),
        config.mmr_overrep,
        config.mmr_max_per_entity,
        config.mmr_diversity_weight,
    );
    Ok(order.into_iter().map(|i| implications[i].clone()).collect())
}
