//! Seed-and-neighbor clustering / anti-clustering over an in-memory corpus
//! (spec §4.8). Both passes are pure functions of a `Vec<Memory>` snapshot
//! so they're independently testable without a store.

use std::collections::BTreeSet;

use mnemograph_core::ids::MemoryId;
use mnemograph_core::memory::{cosine_similarity, Memory};

/// A group of memories that cohere around a shared theme (clustering) or
/// that are surface-distant but abstractly similar (anti-clustering).
#[derive(Debug, Clone)]
pub struct Cluster {
    pub member_ids: Vec<MemoryId>,
    pub anti_cluster: bool,
}

/// Take the top `seed_pool` memories by `strength * activation_count`,
/// and for each not-yet-clustered seed, pull up to `max_neighbors` whose
/// surface-embedding cosine similarity exceeds `sim_cluster`, forming a
/// cluster when at least `min_size` members qualify.
pub fn cluster(
    memories: &[Memory],
    seed_pool: usize,
    sim_cluster: f64,
    max_neighbors: usize,
    min_size: usize,
) -> Vec<Cluster> {
    let with_embeddings: Vec<&Memory> =
        memories.iter().filter(|m| m.embedding.is_some()).collect();

    let mut ranked = with_embeddings.clone();
    ranked.sort_by(|a, b| {
        let score_a = a.strength * a.activation_count as f64;
        let score_b = b.strength * b.activation_count as f64;
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut clustered: BTreeSet<MemoryId> = BTreeSet::new();
    let mut clusters = Vec::new();

    for seed in ranked.into_iter().take(seed_pool) {
        if clustered.contains(&seed.id) {
            continue;
        }
        let seed_vec = seed.embedding.as_deref().expect("filtered above");

        let mut neighbors: Vec<(&Memory, f64)> = with_embeddings
            .iter()
            .filter(|m| m.id != seed.id && !clustered.contains(&m.id))
            .filter_map(|m| {
                let sim = cosine_similarity(seed_vec, m.embedding.as_deref().unwrap());
                (sim > sim_cluster).then_some((*m, sim))
            })
            .collect();
        neighbors.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        neighbors.truncate(max_neighbors);

        if neighbors.len() + 1 < min_size {
            continue;
        }

        let mut member_ids = vec![seed.id.clone()];
        member_ids.extend(neighbors.iter().map(|(m, _)| m.id.clone()));
        for id in &member_ids {
            clustered.insert(id.clone());
        }
        clusters.push(Cluster { member_ids, anti_cluster: false });
    }

    clusters
}

/// Randomly sample `seed_count` memories with abstract embeddings and, for
/// each, gather up to `max_members` others whose raw cosine similarity is
/// below `surface_max` and whose abstract cosine similarity exceeds
/// `abstract_min`, ordered by abstract similarity descending. Skipped
/// entirely if fewer than `min_corpus` memories carry an abstract
/// embedding. `sample_indices` is the caller-chosen random draw (spec §9
/// design notes: randomness is injected, never hidden inside this pure
/// function, so tests can fix the seed set).
pub fn anti_cluster(
    memories: &[Memory],
    sample_indices: &[usize],
    surface_max: f64,
    abstract_min: f64,
    max_members: usize,
    min_size: usize,
    min_corpus: usize,
) -> Vec<Cluster> {
    let with_abstract: Vec<&Memory> = memories
        .iter()
        .filter(|m| m.embedding.is_some() && m.abstract_embedding.is_some())
        .collect();

    if with_abstract.len() < min_corpus {
        return Vec::new();
    }

    let mut used: BTreeSet<MemoryId> = BTreeSet::new();
    let mut clusters = Vec::new();

    for &idx in sample_indices {
        let Some(seed) = with_abstract.get(idx) else { continue };
        if used.contains(&seed.id) {
            continue;
        }
        let seed_surface = seed.embedding.as_deref().unwrap();
        let seed_abstract = seed.abstract_embedding.as_deref().unwrap();

        let mut candidates: Vec<(&Memory, f64)> = with_abstract
            .iter()
            .filter(|m| m.id != seed.id && !used.contains(&m.id))
            .filter_map(|m| {
                let surface_sim = cosine_similarity(seed_surface, m.embedding.as_deref().unwrap());
                let abstract_sim =
                    cosine_similarity(seed_abstract, m.abstract_embedding.as_deref().unwrap());
                (surface_sim < surface_max && abstract_sim > abstract_min)
                    .then_some((*m, abstract_sim))
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        candidates.truncate(max_members);

        if candidates.len() + 1 < min_size {
            continue;
        }

        let mut member_ids = vec![seed.id.clone()];
        member_ids.extend(candidates.iter().map(|(m, _)| m.id.clone()));
        for id in &member_ids {
            used.insert(id.clone());
        }
        clusters.push(Cluster { member_ids, anti_cluster: true });
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mnemograph_core::ids::UserId;
    use mnemograph_core::memory::Significance;
    use std::collections::BTreeSet as Set;

    fn memory_with(id_suffix: &str, embedding: Vec<f32>, strength: f64, count: u64) -> Memory {
        let user = UserId::new();
        let now = Utc::now();
        let mut m = Memory::new(
            user,
            format!("memory {id_suffix}"),
            "journal".to_string(),
            now.date_naive(),
            Set::new(),
            Significance::Medium,
            now,
        )
        .with_embedding(embedding);
        m.strength = strength;
        m.activation_count = count;
        m
    }

    fn unit(mut v: Vec<f32>) -> Vec<f32> {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        for x in v.iter_mut() {
            *x /= norm;
        }
        v
    }

    #[test]
    fn cluster_groups_similar_seeds_above_threshold() {
        let seed = memory_with("seed", unit(vec![1.0, 0.0, 0.0]), 2.0, 5);
        let near = memory_with("near", unit(vec![0.98, 0.2, 0.0]), 1.0, 1);
        let near2 = memory_with("near2", unit(vec![0.97, 0.24, 0.0]), 1.0, 1);
        let far = memory_with("far", unit(vec![0.0, 1.0, 0.0]), 1.0, 1);

        let memories = vec![seed.clone(), near, near2, far];
        let clusters = cluster(&memories, 10, 0.65, 14, 3);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].member_ids.len(), 3);
        assert!(clusters[0].member_ids.contains(&seed.id));
    }

    #[test]
    fn cluster_skips_seed_with_too_few_qualifying_neighbors() {
        let seed = memory_with("seed", unit(vec![1.0, 0.0]), 2.0, 5);
        let only_one = memory_with("n1", unit(vec![0.99, 0.1]), 1.0, 1);
        let memories = vec![seed, only_one];
        let clusters = cluster(&memories, 10, 0.65, 14, 3);
        assert!(clusters.is_empty());
    }

    #[test]
    fn anti_cluster_requires_min_corpus() {
        let mut m = memory_with("a", unit(vec![1.0, 0.0]), 1.0, 1);
        m.abstract_embedding = Some(unit(vec![1.0, 0.0]));
        let memories = vec![m];
        let clusters = anti_cluster(&memories, &[0], 0.35, 0.55, 5, 3, 10);
        assert!(clusters.is_empty());
    }

    #[test]
    fn anti_cluster_finds_surface_distant_abstract_near_members() {
        let mut memories = Vec::new();
        let seed_surface = unit(vec![1.0, 0.0, 0.0, 0.0]);
        let seed_abstract = unit(vec![0.0, 1.0, 0.0, 0.0]);
        let mut seed = memory_with("seed", seed_surface.clone(), 1.0, 1);
        seed.abstract_embedding = Some(seed_abstract.clone());
        memories.push(seed.clone());

        for i in 0..2 {
            let surface = unit(vec![0.0, 0.0, 1.0, i as f32 * 0.1]);
            let mut m = memory_with(&format!("far{i}"), surface, 1.0, 1);
            m.abstract_embedding = Some(unit(vec![0.05 * i as f32, 0.95, 0.0, 0.0]));
            memories.push(m);
        }
        for i in 0..8 {
            let mut filler = memory_with(&format!("filler{i}"), unit(vec![0.0, 0.0, 0.0, 1.0]), 1.0, 1);
            filler.abstract_embedding = Some(unit(vec![0.0, 0.0, 1.0, 0.0]));
            memories.push(filler);
        }

        let clusters = anti_cluster(&memories, &[0], 0.35, 0.55, 5, 3, 10);
        assert_eq!(clusters.len(), 1);
        assert!(clusters[0].anti_cluster);
        assert!(clusters[0].member_ids.len() >= 3);
    }
}
