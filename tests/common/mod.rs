//! Shared fixtures for integration tests

#![allow(dead_code)]

use cloneline::{
    Artifact, ArtifactStatus, Client, ClientId, Engagement, EngagementId, EngagementStore,
    LineageEdge, MemoryStore, NewArtifact, NewEngagement, StorageError, StorageResult,
};
use std::sync::Arc;

/// Store wrapper that fails `create_artifact` for titles it was told to reject
pub struct FlakyStore {
    inner: MemoryStore,
    reject_titles: Vec<String>,
    fail_lineage: bool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            reject_titles: Vec::new(),
            fail_lineage: false,
        }
    }

    pub fn rejecting(mut self, title: &str) -> Self {
        self.reject_titles.push(title.to_string());
        self
    }

    pub fn failing_lineage(mut self) -> Self {
        self.fail_lineage = true;
        self
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl EngagementStore for FlakyStore {
    fn create_client(&self, name: &str) -> StorageResult<Client> {
        self.inner.create_client(name)
    }

    fn get_client(&self, id: &ClientId) -> StorageResult<Option<Client>> {
        self.inner.get_client(id)
    }

    fn get_engagement(&self, id: &EngagementId) -> StorageResult<Option<Engagement>> {
        self.inner.get_engagement(id)
    }

    fn create_engagement(&self, fields: NewEngagement) -> StorageResult<Engagement> {
        self.inner.create_engagement(fields)
    }

    fn list_artifacts(
        &self,
        engagement_id: &EngagementId,
        exclude_statuses: &[ArtifactStatus],
    ) -> StorageResult<Vec<Artifact>> {
        self.inner.list_artifacts(engagement_id, exclude_statuses)
    }

    fn create_artifact(&self, fields: NewArtifact) -> StorageResult<Artifact> {
        // Only copies carry a provenance stamp, so seeding is never rejected
        if fields.metadata.cloned_from.is_some() && self.reject_titles.contains(&fields.title) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("disk full while writing '{}'", fields.title),
            )));
        }
        self.inner.create_artifact(fields)
    }

    fn record_lineage_edge(&self, edge: &LineageEdge) -> StorageResult<()> {
        if self.fail_lineage {
            return Err(StorageError::DuplicateEdge {
                parent: edge.parent_engagement_id.to_string(),
                child: edge.child_engagement_id.to_string(),
            });
        }
        self.inner.record_lineage_edge(edge)
    }

    fn edges_by_parent(&self, parent_id: &EngagementId) -> StorageResult<Vec<LineageEdge>> {
        self.inner.edges_by_parent(parent_id)
    }

    fn edge_by_child(&self, child_id: &EngagementId) -> StorageResult<Option<LineageEdge>> {
        self.inner.edge_by_child(child_id)
    }
}

/// A source engagement with its artifacts, plus a target client
pub struct Seeded {
    pub source: Engagement,
    pub target: ClientId,
    pub artifacts: Vec<Artifact>,
}

/// Seed a source engagement with `(title, template, content)` artifacts
pub fn seed(store: &dyn EngagementStore, artifacts: &[(&str, &str, Option<&str>)]) -> Seeded {
    let origin = store.create_client("Acme Corp").unwrap();
    let target = store.create_client("Globex").unwrap();
    let source = store
        .create_engagement(NewEngagement::draft(origin.id, "Acme Automation Review"))
        .unwrap();
    let artifacts = artifacts
        .iter()
        .map(|(title, template, content)| {
            store
                .create_artifact(NewArtifact::draft(
                    source.id.clone(),
                    *template,
                    *title,
                    content.map(String::from),
                ))
                .unwrap()
        })
        .collect();
    Seeded {
        source,
        target: target.id,
        artifacts,
    }
}

pub fn shared<S: EngagementStore + 'static>(store: S) -> Arc<S> {
    Arc::new(store)
}
