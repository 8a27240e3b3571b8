//! Storage trait definitions

use crate::lineage::LineageEdge;
use crate::model::{
    Artifact, ArtifactId, ArtifactStatus, Client, ClientId, Engagement, EngagementId,
    NewArtifact, NewEngagement,
};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Engagement not found: {0}")]
    EngagementNotFound(String),

    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Lineage edge already recorded: {parent} -> {child}")]
    DuplicateEdge { parent: String, child: String },

    #[error("Engagement {child} already has a parent ({existing_parent})")]
    ParentAlreadyRecorded {
        child: String,
        existing_parent: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A stored artifact that exists but could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableArtifact {
    pub id: ArtifactId,
    pub template_id: String,
    pub reason: String,
}

/// One entry of an artifact scan: decoded, or reported by id
pub type ArtifactRecord = Result<Artifact, UnreadableArtifact>;

/// Persistence collaborator for engagements, artifacts, and lineage edges
///
/// Implementations must be thread-safe (Send + Sync); concurrent clones of
/// the same source only ever write freshly identified records.
pub trait EngagementStore: Send + Sync {
    // === Clients ===

    fn create_client(&self, name: &str) -> StorageResult<Client>;

    fn get_client(&self, id: &ClientId) -> StorageResult<Option<Client>>;

    // === Engagements ===

    fn get_engagement(&self, id: &EngagementId) -> StorageResult<Option<Engagement>>;

    /// Create an engagement with a freshly generated id
    fn create_engagement(&self, fields: NewEngagement) -> StorageResult<Engagement>;

    // === Artifacts ===

    /// Artifacts of an engagement in insertion order, minus excluded statuses
    fn list_artifacts(
        &self,
        engagement_id: &EngagementId,
        exclude_statuses: &[ArtifactStatus],
    ) -> StorageResult<Vec<Artifact>>;

    /// Same listing as `list_artifacts`, but a row that fails to decode is
    /// reported in place instead of failing the whole listing
    fn scan_artifacts(
        &self,
        engagement_id: &EngagementId,
        exclude_statuses: &[ArtifactStatus],
    ) -> StorageResult<Vec<ArtifactRecord>> {
        Ok(self
            .list_artifacts(engagement_id, exclude_statuses)?
            .into_iter()
            .map(Ok)
            .collect())
    }

    /// Create an artifact with a freshly generated id
    fn create_artifact(&self, fields: NewArtifact) -> StorageResult<Artifact>;

    // === Lineage ===

    /// Append an edge. Fails on a repeated `(parent, child)` pair or a
    /// second inbound edge for the same child.
    fn record_lineage_edge(&self, edge: &LineageEdge) -> StorageResult<()>;

    /// Outbound edges of a parent in insertion order
    fn edges_by_parent(&self, parent_id: &EngagementId) -> StorageResult<Vec<LineageEdge>>;

    /// The inbound edge of a child, if any
    fn edge_by_child(&self, child_id: &EngagementId) -> StorageResult<Option<LineageEdge>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: EngagementStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
