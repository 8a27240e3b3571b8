//! CloneOrchestrator: turns one engagement into a new, sanitized one

use super::types::{
    ArtifactOutcome, ArtifactSelection, CloneReport, CloneRequest, CloneResult, CloneSummary,
};
use crate::lineage::LineageGraph;
use crate::model::{Artifact, ArtifactId, ArtifactStatus, Engagement, NewArtifact, NewEngagement};
use crate::sanitize::ContentSanitizer;
use crate::storage::{ArtifactRecord, EngagementStore, StorageError, UnreadableArtifact};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Request problems detected before anything is written
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("source engagement not found: {0}")]
    SourceEngagementNotFound(String),

    #[error("target client not found: {0}")]
    TargetClientNotFound(String),

    #[error("explicit artifact selection is empty")]
    EmptySelection,
}

#[derive(Debug, Error)]
pub enum CloneError {
    #[error("invalid clone request: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type CloneOutcome<T> = Result<T, CloneError>;

/// Drives the clone of one engagement and its artifacts.
///
/// Each call creates exactly one engagement and one lineage edge. Calls are
/// not idempotent: repeating a request makes another independent copy.
#[derive(Clone)]
pub struct CloneOrchestrator {
    store: Arc<dyn EngagementStore>,
    sanitizer: ContentSanitizer,
    lineage: LineageGraph,
}

/// An artifact queued for cloning, a stored row that could not be decoded,
/// or a selected id that could not be found
enum Planned {
    Found(Artifact),
    Unreadable(UnreadableArtifact),
    Missing(ArtifactId),
}

impl From<ArtifactRecord> for Planned {
    fn from(record: ArtifactRecord) -> Self {
        match record {
            Ok(artifact) => Planned::Found(artifact),
            Err(bad) => Planned::Unreadable(bad),
        }
    }
}

impl CloneOrchestrator {
    pub fn new(store: Arc<dyn EngagementStore>, sanitizer: ContentSanitizer) -> Self {
        let lineage = LineageGraph::new(store.clone());
        Self {
            store,
            sanitizer,
            lineage,
        }
    }

    pub fn lineage(&self) -> &LineageGraph {
        &self.lineage
    }

    pub fn sanitizer(&self) -> &ContentSanitizer {
        &self.sanitizer
    }

    pub fn clone_engagement(&self, request: &CloneRequest) -> CloneOutcome<CloneResult> {
        self.clone_detailed(request).map(|report| report.result)
    }

    /// Clone and also return each artifact's outcome in request order
    pub fn clone_detailed(&self, request: &CloneRequest) -> CloneOutcome<CloneReport> {
        let source = self.validate(request)?;
        let planned = self.plan(request)?;
        let cloned_at = Utc::now();

        tracing::info!(
            source = %source.id,
            target_client = %request.target_client_id,
            artifacts = planned.len(),
            clear_client_data = request.clear_client_data,
            "cloning engagement"
        );

        let name = request
            .new_engagement_name
            .clone()
            .unwrap_or_else(|| format!("{} (Clone)", source.name));
        let engagement = self.store.create_engagement(NewEngagement::draft(
            request.target_client_id.clone(),
            name,
        ))?;

        let outcomes: Vec<ArtifactOutcome> = planned
            .into_iter()
            .map(|item| self.clone_artifact(item, &engagement, request, cloned_at))
            .collect();

        let mut summary = CloneSummary::from_outcomes(&outcomes);

        // Snapshot taken before any lineage warning is appended
        let snapshot = summary.clone();
        if let Err(err) = self
            .lineage
            .record_edge(&source.id, &engagement.id, cloned_at, snapshot)
        {
            tracing::error!(
                parent = %source.id,
                child = %engagement.id,
                error = %err,
                "lineage invariant violated while recording clone"
            );
            summary
                .warnings
                .push(format!("lineage not recorded: {}", err));
        }

        tracing::info!(
            new_engagement = %engagement.id,
            cloned = summary.artifacts_cloned,
            skipped = summary.artifacts_skipped,
            fields_cleared = summary.fields_cleared,
            "clone complete"
        );

        Ok(CloneReport {
            result: CloneResult {
                new_engagement_id: engagement.id,
                new_engagement_name: engagement.name,
                summary,
            },
            outcomes,
        })
    }

    /// Fail fast before any write
    fn validate(&self, request: &CloneRequest) -> CloneOutcome<Engagement> {
        if matches!(&request.artifact_selection, ArtifactSelection::Only(ids) if ids.is_empty()) {
            return Err(ValidationError::EmptySelection.into());
        }
        let source = self
            .store
            .get_engagement(&request.source_engagement_id)?
            .ok_or_else(|| {
                ValidationError::SourceEngagementNotFound(request.source_engagement_id.to_string())
            })?;
        if self.store.get_client(&request.target_client_id)?.is_none() {
            return Err(
                ValidationError::TargetClientNotFound(request.target_client_id.to_string()).into(),
            );
        }
        Ok(source)
    }

    fn plan(&self, request: &CloneRequest) -> CloneOutcome<Vec<Planned>> {
        let source_id = &request.source_engagement_id;
        match &request.artifact_selection {
            ArtifactSelection::All => Ok(self
                .store
                .scan_artifacts(source_id, &[ArtifactStatus::Archived])?
                .into_iter()
                .map(Planned::from)
                .collect()),
            ArtifactSelection::Only(ids) => {
                let mut available: Vec<Option<ArtifactRecord>> = self
                    .store
                    .scan_artifacts(source_id, &[])?
                    .into_iter()
                    .map(Some)
                    .collect();
                let mut seen = HashSet::new();
                let mut planned = Vec::with_capacity(ids.len());
                for id in ids.iter().filter(|id| seen.insert(*id)) {
                    let found = available
                        .iter_mut()
                        .find(|slot| match slot {
                            Some(Ok(a)) => &a.id == id,
                            Some(Err(bad)) => &bad.id == id,
                            None => false,
                        })
                        .and_then(Option::take);
                    planned.push(match found {
                        Some(record) => Planned::from(record),
                        None => Planned::Missing(id.clone()),
                    });
                }
                Ok(planned)
            }
        }
    }

    fn clone_artifact(
        &self,
        item: Planned,
        engagement: &Engagement,
        request: &CloneRequest,
        cloned_at: DateTime<Utc>,
    ) -> ArtifactOutcome {
        let artifact = match item {
            Planned::Found(artifact) => artifact,
            Planned::Missing(id) => {
                let warning = format!("artifact {} is not part of the source engagement", id);
                tracing::warn!(artifact = %id, "{}", warning);
                return ArtifactOutcome::skipped(id, "", warning);
            }
            Planned::Unreadable(bad) => {
                let warning = format!("artifact {} could not be read: {}", bad.id, bad.reason);
                tracing::warn!(artifact = %bad.id, "{}", warning);
                return ArtifactOutcome::skipped(bad.id, bad.template_id, warning);
            }
        };

        let processed = self.sanitizer.process_artifact_at(
            &artifact,
            request.clear_client_data,
            request.explicit_fields_to_clear.as_deref(),
            cloned_at,
        );
        let copy = processed.artifact;
        let fields = NewArtifact {
            engagement_id: engagement.id.clone(),
            template_id: copy.template_id,
            title: copy.title,
            content: copy.content,
            status: ArtifactStatus::Draft,
            version: 1,
            metadata: copy.metadata,
        };

        match self.store.create_artifact(fields) {
            Ok(created) => {
                tracing::debug!(
                    source = %artifact.id,
                    new = %created.id,
                    cleared = processed.cleared_fields.len(),
                    "cloned artifact"
                );
                ArtifactOutcome {
                    source_artifact_id: artifact.id,
                    template_id: artifact.template_id,
                    cloned: true,
                    new_artifact_id: Some(created.id),
                    cleared_fields: processed.cleared_fields,
                    preserved_fields: processed.preserved_fields,
                    warning: None,
                }
            }
            Err(err) => {
                let warning = format!(
                    "artifact '{}' ({}) was not cloned: {}",
                    artifact.title, artifact.id, err
                );
                tracing::warn!(artifact = %artifact.id, error = %err, "skipping artifact");
                ArtifactOutcome::skipped(artifact.id, artifact.template_id, warning)
            }
        }
    }
}
