//! Entity-diversity reranking (spec §4.9 step 9). Plain maximal-marginal-
//! relevance: greedily pick the candidate that best balances activation
//! against not piling more results onto a contact who is already
//! over-represented in the candidate pool.

use std::collections::{BTreeSet, HashMap};

use mnemograph_core::ids::ContactId;

pub struct MmrCandidate {
    pub index: usize,
    pub activation: f64,
    pub entity_ids: BTreeSet<ContactId>,
}

/// Greedily selects up to `target_size` candidate indices (original
/// ordering in `candidates` is the source of truth for `index`).
///
/// A contact is "over-represented" if it appears on more than
/// `overrep_fraction` of all candidates; only over-represented contacts
/// incur a diversity penalty, so a query that's inherently about one
/// person doesn't get needlessly scattered.
pub fn diversify(
    candidates: Vec<MmrCandidate>,
    target_size: usize,
    overrep_fraction: f64,
    max_per_entity: f64,
    diversity_weight: f64,
) -> Vec<usize> {
    if candidates.is_empty() || target_size == 0 {
        return Vec::new();
    }

    let total = candidates.len() as f64;
    let mut contact_counts: HashMap<ContactId, usize> = HashMap::new();
    for c in &candidates {
        for id in &c.entity_ids {
            *contact_counts.entry(id.clone()).or_insert(0) += 1;
        }
    }
    let overrepresented: BTreeSet<ContactId> = contact_counts
        .into_iter()
        .filter(|(_, count)| (*count as f64 / total) > overrep_fraction)
        .map(|(id, _)| id)
        .collect();

    let max_activation = candidates
        .iter()
        .map(|c| c.activation)
        .fold(f64::MIN, f64::max)
        .max(1e-12);

    let mut remaining = candidates;
    let mut selected = Vec::new();
    let mut picked_so_far: HashMap<ContactId, usize> = HashMap::new();

    while !remaining.is_empty() && selected.len() < target_size {
        let mut best_pos = 0;
        let mut best_score = f64::MIN;
        for (pos, c) in remaining.iter().enumerate() {
            let diversity_bonus = if c.entity_ids.is_empty() {
                1.0
            } else {
                let max_ratio = c
                    .entity_ids
                    .iter()
                    .filter(|id| overrepresented.contains(*id))
                    .map(|id| *picked_so_far.get(id).unwrap_or(&0) as f64 / max_per_entity)
                    .fold(0.0_f64, f64::max);
                (1.0 - max_ratio).clamp(0.0, 1.0)
            };
            let score = (1.0 - diversity_weight) * (c.activation / max_activation)
                + diversity_weight * diversity_bonus;
            if score > best_score {
                best_score = score;
                best_pos = pos;
            }
        }
        let chosen = remaining.remove(best_pos);
        for id in chosen.entity_ids.iter().filter(|id| overrepresented.contains(*id)) {
            *picked_so_far.entry(id.clone()).or_insert(0) += 1;
        }
        selected.push(chosen.index);
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contacts(raw: &[&str]) -> BTreeSet<ContactId> {
        raw.iter().map(|s| ContactId::new(*s)).collect()
    }

    #[test]
    fn empty_entity_ids_never_take_a_diversity_hit() {
        let candidates = vec![
            MmrCandidate { index: 0, activation: 1.0, entity_ids: BTreeSet::new() },
            MmrCandidate { index: 1, activation: 0.9, entity_ids: BTreeSet::new() },
        ];
        let order = diversify(candidates, 2, 0.3, 3.0, 0.3);
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn overrepresented_contact_gets_spread_out() {
        // 4 candidates mention "alice", 1 mentions "bob" — alice is
        // over-represented at an 0.3 threshold (4/5 > 0.3).
        let candidates = vec![
            MmrCandidate { index: 0, activation: 1.0, entity_ids: contacts(&["alice"]) },
            MmrCandidate { index: 1, activation: 0.95, entity_ids: contacts(&["alice"]) },
            MmrCandidate { index: 2, activation: 0.9, entity_ids: contacts(&["alice"]) },
            MmrCandidate { index: 3, activation: 0.1, entity_ids: contacts(&["bob"]) },
            MmrCandidate { index: 4, activation: 0.85, entity_ids: contacts(&["alice"]) },
        ];
        let order = diversify(candidates, 3, 0.3, 1.0, 0.5);
        // bob should be pulled forward ahead of at least one higher-activation
        // alice-only memory once alice has already been picked once.
        assert!(order.contains(&3));
    }
}
