//! Memory ingest pipeline (C4, spec §4.4): turns journal entries into
//! deduplicated, contact-resolved, embedded memories, with C5's abstract
//! embedding dispatched fire-and-forget once each memory is on file.

mod abstract_embedder;
mod contact_resolution;
mod deps;
mod pipeline;

pub use contact_resolution::{resolve_contacts, ContactRecord, ExplicitMention};
pub use deps::IngestDeps;
pub use pipeline::{ingest, IngestOutcome};
