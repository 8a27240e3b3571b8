//! LineageGraph: records and reads one-hop clone ancestry

use super::types::{LineageEdge, LineageNode, LineageStats, LineageView, Relationship};
use crate::clone::CloneSummary;
use crate::model::EngagementId;
use crate::storage::{EngagementStore, StorageError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LineageError {
    /// An edge for this pair, or a parent for this child, already exists.
    /// Child ids are fresh per clone, so this is an invariant violation.
    #[error("lineage edge already exists: {parent} -> {child}")]
    DuplicateEdge { parent: String, child: String },

    #[error("engagement {0} cannot be its own clone parent")]
    SelfLoop(String),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for LineageError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateEdge { parent, child } => Self::DuplicateEdge { parent, child },
            StorageError::ParentAlreadyRecorded {
                child,
                existing_parent,
            } => Self::DuplicateEdge {
                parent: existing_parent,
                child,
            },
            other => Self::Storage(other),
        }
    }
}

pub type LineageResult<T> = Result<T, LineageError>;

/// Parent/self/children view over the store's lineage edges.
///
/// Traversal is deliberately one hop: grandparents and grandchildren are
/// never loaded.
#[derive(Clone)]
pub struct LineageGraph {
    store: Arc<dyn EngagementStore>,
}

impl LineageGraph {
    pub fn new(store: Arc<dyn EngagementStore>) -> Self {
        Self { store }
    }

    /// Append one edge. Never retried on conflict.
    pub fn record_edge(
        &self,
        parent_id: &EngagementId,
        child_id: &EngagementId,
        cloned_at: DateTime<Utc>,
        summary: CloneSummary,
    ) -> LineageResult<LineageEdge> {
        if parent_id == child_id {
            return Err(LineageError::SelfLoop(parent_id.to_string()));
        }
        let edge = LineageEdge {
            parent_engagement_id: parent_id.clone(),
            child_engagement_id: child_id.clone(),
            cloned_at,
            summary,
        };
        self.store.record_lineage_edge(&edge)?;
        tracing::debug!(parent = %parent_id, child = %child_id, "recorded lineage edge");
        Ok(edge)
    }

    pub fn get_lineage(&self, engagement_id: &EngagementId) -> LineageResult<LineageView> {
        // The inbound edge names the parent and describes how this engagement came to be
        let inbound = self.store.edge_by_child(engagement_id)?;
        let parent = inbound.as_ref().map(|edge| LineageNode {
            engagement_id: edge.parent_engagement_id.clone(),
            relationship: Relationship::Parent,
            cloned_at: None,
            summary: None,
        });

        let mut edges = self.store.edges_by_parent(engagement_id)?;
        edges.sort_by(|a, b| {
            a.cloned_at
                .cmp(&b.cloned_at)
                .then_with(|| a.child_engagement_id.cmp(&b.child_engagement_id))
        });
        let children = edges
            .into_iter()
            .map(|edge| LineageNode {
                engagement_id: edge.child_engagement_id,
                relationship: Relationship::Child,
                cloned_at: Some(edge.cloned_at),
                summary: Some(edge.summary),
            })
            .collect();

        let self_node = LineageNode {
            engagement_id: engagement_id.clone(),
            relationship: Relationship::SelfNode,
            cloned_at: inbound.as_ref().map(|e| e.cloned_at),
            summary: inbound.map(|e| e.summary),
        };

        Ok(LineageView {
            parent,
            self_node,
            children,
        })
    }

    pub fn get_stats(&self, engagement_id: &EngagementId) -> LineageResult<LineageStats> {
        let view = self.get_lineage(engagement_id)?;
        let is_cloned = view.parent.is_some();
        let clone_count = view.children.len();
        Ok(LineageStats {
            is_cloned,
            clone_count,
            total_in_lineage: 1 + usize::from(is_cloned) + clone_count,
        })
    }
}
