use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::connection::ConnectionType;
use crate::errors::MnemoResult;
use crate::implication::{ImplicationOrder, ImplicationType};
use crate::ids::{ContactId, MemoryId};

/// Input to the extraction prompt (spec §4.2, §4.4): one journal entry.
#[derive(Debug, Clone)]
pub struct ExtractRequest<'a> {
    pub entry_text: &'a str,
    pub entry_date: NaiveDate,
    /// `{id, name}` snapshot the caller supplies for this ingest run. Not
    /// required for extraction itself, but passed through so the prompt can
    /// spell names out consistently; resolution to [`ContactId`] happens in
    /// `mnemograph-ingest`'s contact-resolution step (spec §4.4), never here.
    pub contact_names: &'a [String],
}

/// One atomic memory pulled out of a journal entry by the extraction
/// prompt, prior to embedding, contact resolution, or persistence.
///
/// `contact_names` are raw strings as the model wrote them — spec §4.4's
/// contact-resolution algorithm (explicit mentions, first-token matching,
/// full/first-name matching against the snapshot) turns these into
/// [`ContactId`]s; that matching never happens inside the LLM boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedMemory {
    pub content: String,
    pub significance: crate::memory::Significance,
    #[serde(default)]
    pub contact_names: Vec<String>,
}

/// Input to the abstraction prompt (spec §4.5): the memory's surface
/// content, restated as a context-free structural pattern before a
/// second embedding pass.
#[derive(Debug, Clone)]
pub struct AbstractRequest<'a> {
    pub content: &'a str,
}

/// Input to the connection-discovery prompt (spec §4.8 stage 1): a cluster
/// of memories, the contacts mentioned across it, and whether the cluster
/// is an anti-cluster (far apart on the surface, close in abstract space —
/// the prompt phrases connection hints differently in that case).
#[derive(Debug, Clone)]
pub struct DiscoverConnectionsRequest<'a> {
    pub cluster_contents: &'a [(MemoryId, String)],
    pub contacts: &'a [(ContactId, String)],
    pub anti_cluster: bool,
}

/// One candidate connection the LLM proposed between two memories in a
/// cluster (spec §4.8 stage 1 output shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionCandidate {
    pub memory_a_id: MemoryId,
    pub memory_b_id: MemoryId,
    pub connection_type: ConnectionType,
    pub reason: String,
}

/// Input to the implication-synthesis prompt (spec §4.8 stage 2): a
/// cluster of memories that cohere around a shared theme, the connections
/// stage 1 just discovered between them, the contacts involved, and
/// whether this is an anti-cluster.
#[derive(Debug, Clone)]
pub struct SynthesizeImplicationRequest<'a> {
    pub cluster_contents: &'a [(MemoryId, String)],
    pub connections: &'a [ConnectionCandidate],
    pub contacts: &'a [(ContactId, String)],
    pub anti_cluster: bool,
}

/// A higher-order insight the LLM synthesized from a cluster, before the
/// quality-gate prompt scores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplicationCandidate {
    pub content: String,
    pub implication_type: ImplicationType,
    pub implication_order: ImplicationOrder,
    pub source_memory_ids: BTreeSet<MemoryId>,
}

/// Input to the quality-gate scoring prompt (spec §4.8 stage 3). The
/// response is a single digit 1-5, compared against `QUALITY_THRESHOLD`;
/// non-numeric model output is a [`crate::errors::LlmError`] the caller
/// treats as fail-open per `quality_fail_open` (spec §9 open question).
#[derive(Debug, Clone)]
pub struct ScoreRequest<'a> {
    pub implication_content: &'a str,
    pub source_contents: &'a [String],
}

/// LLM client (C2, spec §4.2). Five structured prompts, each returning
/// parsed JSON or an [`crate::errors::LlmError`] describing why parsing
/// failed. Implementations own their own retry/backoff and deadline
/// enforcement; callers pass a remaining-time budget, not a retry count.
pub trait ILlmProvider: Send + Sync {
    /// Pull atomic, self-contained memories out of one journal entry.
    fn extract(&self, req: ExtractRequest<'_>) -> MnemoResult<Vec<ExtractedMemory>>;

    /// Restate a memory's content as a structural pattern, stripped of
    /// surface-level names, dates, and other specifics.
    fn abstract_pattern(&self, req: AbstractRequest<'_>) -> MnemoResult<String>;

    /// Propose typed connections between memories in a consolidation
    /// cluster. At most 4 (spec §4.8 stage 1).
    fn discover_connections(
        &self,
        req: DiscoverConnectionsRequest<'_>,
    ) -> MnemoResult<Vec<ConnectionCandidate>>;

    /// Synthesize at most one higher-order implication from a cluster of
    /// memories (spec §4.8 stage 2).
    fn synthesize_implication(
        &self,
        req: SynthesizeImplicationRequest<'_>,
    ) -> MnemoResult<Option<ImplicationCandidate>>;

    /// Score a candidate implication's quality, 1-5 (spec §4.8 stage 3).
    fn score(&self, req: ScoreRequest<'_>) -> MnemoResult<u8>;

    /// Human-readable provider name, used in log fields.
    fn name(&self) -> &str;
}
