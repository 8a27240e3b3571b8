//! cloneline: engagement cloning with client-data sanitization
//!
//! Duplicates an existing client engagement (and a subset of its artifacts)
//! into a new engagement, scrubbing client-identifying content while keeping
//! reusable methodology, and records an auditable parent/child lineage edge.
//!
//! # Pipeline
//!
//! - **Classify**: [`FieldClassifier`] splits content keys into client-sensitive,
//!   preservable, and unclassified using an injected [`FieldCatalog`]
//! - **Sanitize**: [`ContentSanitizer`] clears structured fields or redacts
//!   free text, and stamps clone provenance on every artifact
//! - **Clone**: [`CloneOrchestrator`] validates, copies artifacts with
//!   partial-success semantics, and aggregates a [`CloneSummary`]
//! - **Lineage**: [`LineageGraph`] appends one immutable edge per clone and
//!   answers one-hop parent/self/children queries
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cloneline::{
//!     CloneApi, CloneRequest, EngagementStore, FieldCatalog, MemoryStore, NewEngagement,
//! };
//!
//! let store = Arc::new(MemoryStore::new());
//! let client = store.create_client("Acme").unwrap();
//! let source = store
//!     .create_engagement(NewEngagement::draft(client.id.clone(), "Discovery"))
//!     .unwrap();
//!
//! let api = CloneApi::new(store, Arc::new(FieldCatalog::builtin()));
//! let result = api
//!     .clone_engagement(&CloneRequest::new(source.id, client.id))
//!     .unwrap();
//! assert_eq!(result.summary.artifacts_cloned, 0);
//! ```

pub mod api;
pub mod classify;
pub mod clone;
pub mod config;
pub mod lineage;
pub mod model;
pub mod sanitize;
pub mod storage;

pub use api::CloneApi;
pub use classify::{Classification, FieldClassifier};
pub use clone::{
    ArtifactOutcome, ArtifactSelection, CloneError, CloneOrchestrator, CloneReport, CloneRequest,
    CloneResult, CloneSummary, ValidationError,
};
pub use config::{ConfigError, FieldCatalog};
pub use lineage::{
    LineageEdge, LineageError, LineageGraph, LineageNode, LineageStats, LineageView, Relationship,
};
pub use model::{
    Artifact, ArtifactContent, ArtifactId, ArtifactMetadata, ArtifactStatus, Client, ClientId,
    Engagement, EngagementId, EngagementStatus, FieldCategory, FieldDefinition, NewArtifact,
    NewEngagement,
};
pub use sanitize::{ContentSanitizer, ProcessedArtifact, SanitizedContent};
pub use storage::{
    ArtifactRecord, EngagementStore, MemoryStore, OpenStore, SqliteStore, StorageError,
    StorageResult, UnreadableArtifact,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
