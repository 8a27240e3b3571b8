//! Clone lineage: append-only parent/child edges between engagements

mod graph;
mod types;

pub use graph::{LineageError, LineageGraph, LineageResult};
pub use types::{LineageEdge, LineageNode, LineageStats, LineageView, Relationship};
