//! Core domain records: clients, engagements, artifacts, field definitions

mod artifact;
mod engagement;
mod field;
mod ids;

pub use artifact::{Artifact, ArtifactContent, ArtifactMetadata, ArtifactStatus, NewArtifact};
pub use engagement::{Client, Engagement, EngagementStatus, NewEngagement};
pub use field::{FieldCategory, FieldDefinition};
pub use ids::{ArtifactId, ClientId, EngagementId};
