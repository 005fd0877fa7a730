//! # mnemograph-core
//!
//! Foundation crate for the Mnemograph associative memory engine.
//! Defines all types, traits, errors, config, and constants; every other
//! crate in the workspace depends on this one.

pub mod config;
pub mod connection;
pub mod constants;
pub mod digest;
pub mod errors;
pub mod ids;
pub mod implication;
pub mod memory;
pub mod sync_state;
pub mod traits;

#[cfg(feature = "testing")]
pub mod testing;

// Re-export the most commonly used types at the crate root.
pub use config::MnemoConfig;
pub use connection::{Connection, ConnectionType};
pub use digest::{Digest, DigestCounts, DigestSnippet, DigestSnippetKind};
pub use errors::{MnemoError, MnemoResult};
pub use ids::{ConnectionId, ContactId, DigestId, ImplicationId, MemoryId, SourceId, SyncStateId, UserId};
pub use implication::{Implication, ImplicationOrder, ImplicationType};
pub use memory::{Memory, Significance};
pub use sync_state::SyncState;
