//! Clone request, per-artifact outcome, and aggregated result types

use crate::model::{ArtifactId, ClientId, EngagementId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which artifacts of the source engagement to clone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactSelection {
    /// Every non-archived artifact, in stored order
    All,
    /// These artifacts, in the given order
    Only(Vec<ArtifactId>),
}

/// A request to clone one engagement for a (possibly different) client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneRequest {
    pub source_engagement_id: EngagementId,
    pub target_client_id: ClientId,
    pub artifact_selection: ArtifactSelection,
    pub clear_client_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_fields_to_clear: Option<Vec<String>>,
    /// Name for the new engagement; defaults to "<source> (Clone)"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_engagement_name: Option<String>,
}

impl CloneRequest {
    /// Clone every non-archived artifact with client data cleared
    pub fn new(source_engagement_id: EngagementId, target_client_id: ClientId) -> Self {
        Self {
            source_engagement_id,
            target_client_id,
            artifact_selection: ArtifactSelection::All,
            clear_client_data: true,
            explicit_fields_to_clear: None,
            new_engagement_name: None,
        }
    }

    pub fn with_selection(mut self, ids: Vec<ArtifactId>) -> Self {
        self.artifact_selection = ArtifactSelection::Only(ids);
        self
    }

    pub fn keep_client_data(mut self) -> Self {
        self.clear_client_data = false;
        self
    }

    pub fn with_fields_to_clear(mut self, fields: Vec<String>) -> Self {
        self.explicit_fields_to_clear = Some(fields);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.new_engagement_name = Some(name.into());
        self
    }
}

/// What happened to one artifact during a clone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactOutcome {
    pub source_artifact_id: ArtifactId,
    pub template_id: String,
    pub cloned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_artifact_id: Option<ArtifactId>,
    pub cleared_fields: Vec<String>,
    pub preserved_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ArtifactOutcome {
    pub fn skipped(
        source_artifact_id: ArtifactId,
        template_id: impl Into<String>,
        warning: impl Into<String>,
    ) -> Self {
        Self {
            source_artifact_id,
            template_id: template_id.into(),
            cloned: false,
            new_artifact_id: None,
            cleared_fields: Vec::new(),
            preserved_fields: Vec::new(),
            warning: Some(warning.into()),
        }
    }
}

/// Aggregate counts for a clone; also snapshotted onto the lineage edge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneSummary {
    pub artifacts_cloned: usize,
    pub artifacts_skipped: usize,
    pub fields_cleared: usize,
    pub fields_preserved: usize,
    /// Distinct cleared field names, first occurrence order
    pub cleared_fields: Vec<String>,
    pub warnings: Vec<String>,
}

impl CloneSummary {
    /// Aggregate outcomes in order. Field counts cover cloned artifacts only.
    pub fn from_outcomes(outcomes: &[ArtifactOutcome]) -> Self {
        let mut summary = Self::default();
        let mut seen = HashSet::new();
        for outcome in outcomes {
            if outcome.cloned {
                summary.artifacts_cloned += 1;
                summary.fields_cleared += outcome.cleared_fields.len();
                summary.fields_preserved += outcome.preserved_fields.len();
                for field in &outcome.cleared_fields {
                    if seen.insert(field.as_str()) {
                        summary.cleared_fields.push(field.clone());
                    }
                }
            } else {
                summary.artifacts_skipped += 1;
            }
            if let Some(w) = &outcome.warning {
                summary.warnings.push(w.clone());
            }
        }
        summary
    }
}

/// Result returned to callers of a clone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneResult {
    pub new_engagement_id: EngagementId,
    pub new_engagement_name: String,
    pub summary: CloneSummary,
}

/// A clone result together with each artifact's outcome, in request order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneReport {
    pub result: CloneResult,
    pub outcomes: Vec<ArtifactOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cloned(id: &str, cleared: &[&str], preserved: &[&str]) -> ArtifactOutcome {
        ArtifactOutcome {
            source_artifact_id: ArtifactId::from(id),
            template_id: "discovery".into(),
            cloned: true,
            new_artifact_id: Some(ArtifactId::generate()),
            cleared_fields: cleared.iter().map(|s| s.to_string()).collect(),
            preserved_fields: preserved.iter().map(|s| s.to_string()).collect(),
            warning: None,
        }
    }

    #[test]
    fn summary_dedups_cleared_names_and_keeps_warning_order() {
        let outcomes = vec![
            cloned("a", &["client_name", "budget"], &["phase"]),
            ArtifactOutcome::skipped(ArtifactId::from("b"), "roi", "first failure"),
            cloned("c", &["budget", "contact"], &[]),
            ArtifactOutcome::skipped(ArtifactId::from("d"), "roi", "second failure"),
        ];
        let summary = CloneSummary::from_outcomes(&outcomes);
        assert_eq!(summary.artifacts_cloned, 2);
        assert_eq!(summary.artifacts_skipped, 2);
        assert_eq!(summary.fields_cleared, 4);
        assert_eq!(summary.fields_preserved, 1);
        assert_eq!(summary.cleared_fields, vec!["client_name", "budget", "contact"]);
        assert_eq!(summary.warnings, vec!["first failure", "second failure"]);
    }

    #[test]
    fn result_serializes_with_camel_case_names() {
        let result = CloneResult {
            new_engagement_id: EngagementId::from("e2"),
            new_engagement_name: "Copy".into(),
            summary: CloneSummary::default(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "newEngagementId": "e2",
                "newEngagementName": "Copy",
                "summary": {
                    "artifactsCloned": 0,
                    "artifactsSkipped": 0,
                    "fieldsCleared": 0,
                    "fieldsPreserved": 0,
                    "clearedFields": [],
                    "warnings": []
                }
            })
        );
    }

    #[test]
    fn request_builder_defaults() {
        let req = CloneRequest::new(EngagementId::from("e1"), ClientId::from("c1"));
        assert_eq!(req.artifact_selection, ArtifactSelection::All);
        assert!(req.clear_client_data);
        assert!(!req.keep_client_data().clear_client_data);
    }
}
