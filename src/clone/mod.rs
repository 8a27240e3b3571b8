//! Engagement cloning: request, orchestration, and summarized result

mod orchestrator;
mod types;

pub use orchestrator::{CloneError, CloneOrchestrator, CloneOutcome, ValidationError};
pub use types::{
    ArtifactOutcome, ArtifactSelection, CloneReport, CloneRequest, CloneResult, CloneSummary,
};
