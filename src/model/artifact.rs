//! Artifacts and their content

use super::ids::{ArtifactId, EngagementId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Review state of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Draft,
    InReview,
    Final,
    Archived,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InReview => "in_review",
            Self::Final => "final",
            Self::Archived => "archived",
        }
    }
}

impl std::str::FromStr for ArtifactStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "in_review" => Ok(Self::InReview),
            "final" => Ok(Self::Final),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("unknown artifact status: {}", s)),
        }
    }
}

/// Artifact metadata: provenance stamp plus pass-through keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMetadata {
    /// Artifact this one was cloned from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloned_from: Option<ArtifactId>,
    /// When the clone was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloned_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stored artifact. `content` is the raw serialized body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub engagement_id: EngagementId,
    pub template_id: String,
    pub title: String,
    pub content: Option<String>,
    pub status: ArtifactStatus,
    pub version: u32,
    pub metadata: ArtifactMetadata,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating an artifact; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtifact {
    pub engagement_id: EngagementId,
    pub template_id: String,
    pub title: String,
    pub content: Option<String>,
    pub status: ArtifactStatus,
    pub version: u32,
    pub metadata: ArtifactMetadata,
}

impl NewArtifact {
    /// A first-version draft artifact
    pub fn draft(
        engagement_id: EngagementId,
        template_id: impl Into<String>,
        title: impl Into<String>,
        content: Option<String>,
    ) -> Self {
        Self {
            engagement_id,
            template_id: template_id.into(),
            title: title.into(),
            content,
            status: ArtifactStatus::Draft,
            version: 1,
            metadata: ArtifactMetadata::default(),
        }
    }

    pub fn with_status(mut self, status: ArtifactStatus) -> Self {
        self.status = status;
        self
    }
}

/// Artifact content resolved once from its raw form
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactContent {
    /// A JSON object of named fields
    Structured(Map<String, Value>),
    /// Free text, including JSON that is not an object
    Text(String),
    /// Absent or blank content
    Empty,
}

impl ArtifactContent {
    /// Resolve raw content with a single parse attempt
    pub fn resolve(raw: Option<&str>) -> Self {
        let raw = match raw {
            Some(r) if !r.trim().is_empty() => r,
            _ => return Self::Empty,
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Self::Structured(map),
            _ => Self::Text(raw.to_string()),
        }
    }

    /// Serialize back to the raw stored form
    pub fn into_raw(self) -> Option<String> {
        match self {
            Self::Structured(map) => Some(Value::Object(map).to_string()),
            Self::Text(text) => Some(text),
            Self::Empty => None,
        }
    }
}
