//! Background run scheduler (C10, spec §4.10): single-writer-per-`(user,
//! kind)` coordination for ingest and consolidation, wall-clock deadlines,
//! and idempotent-by-day digest persistence. The only crate in the
//! workspace that runs on `tokio` — every pipeline it drives
//! (`mnemograph-ingest`, `mnemograph-consolidation`) is ordinary
//! synchronous Rust, dispatched via `spawn_blocking` (spec §11).

mod consolidation_runner;
mod ingest_runner;
mod run_lock;
mod scheduler;

pub use consolidation_runner::run_consolidation_for_user;
pub use ingest_runner::{run_ingest_for_user, IngestRunSummary, PendingSource};
pub use run_lock::{RunGuard, RunKind, RunLock};
pub use scheduler::Scheduler;
