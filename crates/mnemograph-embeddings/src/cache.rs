use dashmap::DashMap;

/// In-process content-hash cache, keyed on a blake3 digest of the exact
/// text embedded. One tier only — the teacher's three-tier (memory/disk/
/// remote) cache collapses to this single in-memory tier because a
/// personal memory corpus's working set fits comfortably in RAM and this
/// crate has no disk-cache requirement in spec (spec §9 non-goals).
pub struct EmbeddingCache {
    entries: DashMap<[u8; 32], Vec<f32>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, text: &str) -> Option<Vec<f32>> {
        let key = *blake3::hash(text.as_bytes()).as_bytes();
        self.entries.get(&key).map(|v| v.clone())
    }

    pub fn put(&self, text: &str, embedding: Vec<f32>) {
        let key = *blake3::hash(text.as_bytes()).as_bytes();
        self.entries.insert(key, embedding);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let cache = EmbeddingCache::new();
        cache.put("hello", vec![1.0, 2.0, 3.0]);
        assert_eq!(cache.get("hello"), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(cache.get("other"), None);
    }
}
