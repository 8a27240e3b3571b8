//! Storage backends for cloneline
//!
//! The clone pipeline reaches persistence only through the
//! `EngagementStore` trait. `SqliteStore` is the persistent backend;
//! `MemoryStore` serves tests and embedding callers.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{
    ArtifactRecord, EngagementStore, OpenStore, StorageError, StorageResult, UnreadableArtifact,
};
