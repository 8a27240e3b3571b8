//! Lineage records and views

use crate::clone::CloneSummary;
use crate::model::EngagementId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record that `child` was cloned from `parent`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageEdge {
    pub parent_engagement_id: EngagementId,
    pub child_engagement_id: EngagementId,
    pub cloned_at: DateTime<Utc>,
    pub summary: CloneSummary,
}

/// Position of a node relative to the engagement being viewed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Parent,
    #[serde(rename = "self")]
    SelfNode,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageNode {
    pub engagement_id: EngagementId,
    pub relationship: Relationship,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloned_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<CloneSummary>,
}

/// One-hop neighborhood of an engagement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageView {
    pub parent: Option<LineageNode>,
    #[serde(rename = "self")]
    pub self_node: LineageNode,
    pub children: Vec<LineageNode>,
}

impl LineageView {
    /// Flatten to parent, self, then children for display
    pub fn into_nodes(self) -> Vec<LineageNode> {
        let mut nodes = Vec::with_capacity(2 + self.children.len());
        nodes.extend(self.parent);
        nodes.push(self.self_node);
        nodes.extend(self.children);
        nodes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageStats {
    pub is_cloned: bool,
    pub clone_count: usize,
    pub total_in_lineage: usize,
}
