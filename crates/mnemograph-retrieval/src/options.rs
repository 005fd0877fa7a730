use mnemograph_core::config::RetrievalConfig;
use mnemograph_core::ids::ContactId;

/// Per-call overrides of the retrieval engine's defaults (spec §4.9).
#[derive(Debug, Clone)]
pub struct RetrieveOptions {
    pub max_memories: usize,
    pub max_hops: usize,
    pub min_strength: f64,
    /// Restrict traversal and seeding to memories mentioning this contact.
    /// Also suppresses diversity reranking (spec §4.9 step 9: MMR is
    /// skipped whenever a contact filter narrows the query already).
    pub contact_filter: Option<ContactId>,
    pub skip_hebbian: bool,
    pub diversify: bool,
}

impl RetrieveOptions {
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self {
            max_memories: config.default_max_memories,
            max_hops: config.default_max_hops,
            min_strength: config.default_min_strength,
            contact_filter: None,
            skip_hebbian: false,
            diversify: true,
        }
    }

    /// Whether diversity reranking should run for this call (spec §4.9
    /// step 9: skipped if the caller opted out, or if a contact filter is
    /// already narrowing results to one person).
    pub fn should_diversify(&self) -> bool {
        self.diversify && self.contact_filter.is_none()
    }
}
