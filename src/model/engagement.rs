//! Clients and engagements

use super::ids::{ClientId, EngagementId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A client organization that engagements are delivered for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of an engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStatus {
    Draft,
    Active,
    Completed,
    Archived,
}

impl EngagementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl std::str::FromStr for EngagementStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("unknown engagement status: {}", s)),
        }
    }
}

/// A unit of client work that owns a set of artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    pub id: EngagementId,
    pub client_id: ClientId,
    pub name: String,
    pub status: EngagementStatus,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating an engagement; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewEngagement {
    pub client_id: ClientId,
    pub name: String,
    pub status: EngagementStatus,
}

impl NewEngagement {
    /// A draft engagement for the given client
    pub fn draft(client_id: ClientId, name: impl Into<String>) -> Self {
        Self {
            client_id,
            name: name.into(),
            status: EngagementStatus::Draft,
        }
    }
}
