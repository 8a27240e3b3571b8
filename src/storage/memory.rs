//! In-memory store backed by `DashMap`

use super::traits::{EngagementStore, StorageError, StorageResult};
use crate::lineage::LineageEdge;
use crate::model::{
    Artifact, ArtifactId, ArtifactStatus, Client, ClientId, Engagement, EngagementId,
    NewArtifact, NewEngagement,
};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Concurrent in-memory store
///
/// Artifacts carry an insertion sequence so listings keep stored order.
/// Lineage edges live behind a single mutex so the duplicate and
/// single-parent checks happen atomically with the append.
#[derive(Debug, Default)]
pub struct MemoryStore {
    clients: DashMap<ClientId, Client>,
    engagements: DashMap<EngagementId, Engagement>,
    artifacts: DashMap<ArtifactId, (u64, Artifact)>,
    edges: Mutex<Vec<LineageEdge>>,
    seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engagement_count(&self) -> usize {
        self.engagements.len()
    }

    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.lock().map(|e| e.len()).unwrap_or(0)
    }
}

impl EngagementStore for MemoryStore {
    fn create_client(&self, name: &str) -> StorageResult<Client> {
        let client = Client {
            id: ClientId::generate(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.clients.insert(client.id.clone(), client.clone());
        Ok(client)
    }

    fn get_client(&self, id: &ClientId) -> StorageResult<Option<Client>> {
        Ok(self.clients.get(id).map(|r| r.clone()))
    }

    fn get_engagement(&self, id: &EngagementId) -> StorageResult<Option<Engagement>> {
        Ok(self.engagements.get(id).map(|r| r.clone()))
    }

    fn create_engagement(&self, fields: NewEngagement) -> StorageResult<Engagement> {
        if !self.clients.contains_key(&fields.client_id) {
            return Err(StorageError::ClientNotFound(fields.client_id.to_string()));
        }
        let engagement = Engagement {
            id: EngagementId::generate(),
            client_id: fields.client_id,
            name: fields.name,
            status: fields.status,
            created_at: Utc::now(),
        };
        self.engagements
            .insert(engagement.id.clone(), engagement.clone());
        Ok(engagement)
    }

    fn list_artifacts(
        &self,
        engagement_id: &EngagementId,
        exclude_statuses: &[ArtifactStatus],
    ) -> StorageResult<Vec<Artifact>> {
        let mut found: Vec<(u64, Artifact)> = self
            .artifacts
            .iter()
            .filter(|r| {
                let (_, a) = r.value();
                &a.engagement_id == engagement_id && !exclude_statuses.contains(&a.status)
            })
            .map(|r| r.value().clone())
            .collect();
        found.sort_by_key(|(seq, _)| *seq);
        Ok(found.into_iter().map(|(_, a)| a).collect())
    }

    fn create_artifact(&self, fields: NewArtifact) -> StorageResult<Artifact> {
        if !self.engagements.contains_key(&fields.engagement_id) {
            return Err(StorageError::EngagementNotFound(
                fields.engagement_id.to_string(),
            ));
        }
        let artifact = Artifact {
            id: ArtifactId::generate(),
            engagement_id: fields.engagement_id,
            template_id: fields.template_id,
            title: fields.title,
            content: fields.content,
            status: fields.status,
            version: fields.version,
            metadata: fields.metadata,
            created_at: Utc::now(),
        };
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.artifacts
            .insert(artifact.id.clone(), (seq, artifact.clone()));
        Ok(artifact)
    }

    fn record_lineage_edge(&self, edge: &LineageEdge) -> StorageResult<()> {
        let mut edges = self.edges.lock().map_err(|_| StorageError::LockPoisoned)?;
        if let Some(existing) = edges
            .iter()
            .find(|e| e.child_engagement_id == edge.child_engagement_id)
        {
            if existing.parent_engagement_id == edge.parent_engagement_id {
                return Err(StorageError::DuplicateEdge {
                    parent: edge.parent_engagement_id.to_string(),
                    child: edge.child_engagement_id.to_string(),
                });
            }
            return Err(StorageError::ParentAlreadyRecorded {
                child: edge.child_engagement_id.to_string(),
                existing_parent: existing.parent_engagement_id.to_string(),
            });
        }
        edges.push(edge.clone());
        Ok(())
    }

    fn edges_by_parent(&self, parent_id: &EngagementId) -> StorageResult<Vec<LineageEdge>> {
        let edges = self.edges.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(edges
            .iter()
            .filter(|e| &e.parent_engagement_id == parent_id)
            .cloned()
            .collect())
    }

    fn edge_by_child(&self, child_id: &EngagementId) -> StorageResult<Option<LineageEdge>> {
        let edges = self.edges.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(edges
            .iter()
            .find(|e| &e.child_engagement_id == child_id)
            .cloned())
    }
}
