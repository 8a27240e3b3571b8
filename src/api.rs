//! Transport-independent API layer.
//!
//! `CloneApi` is the single entry point for consumer-facing operations.
//! Transports (CLI, HTTP handlers, direct embedding) call `CloneApi`
//! methods rather than wiring the orchestrator, lineage graph, and
//! sanitizer themselves.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::classify::{Classification, FieldClassifier};
use crate::clone::{CloneOrchestrator, CloneOutcome, CloneReport, CloneRequest, CloneResult};
use crate::config::FieldCatalog;
use crate::lineage::{LineageNode, LineageResult, LineageStats, LineageView};
use crate::model::EngagementId;
use crate::sanitize::{ContentSanitizer, SanitizedContent};
use crate::storage::EngagementStore;

/// Single entry point for all consumer-facing operations.
#[derive(Clone)]
pub struct CloneApi {
    store: Arc<dyn EngagementStore>,
    orchestrator: CloneOrchestrator,
}

impl CloneApi {
    /// Wire the pipeline over a store and an immutable field catalog.
    pub fn new(store: Arc<dyn EngagementStore>, catalog: Arc<FieldCatalog>) -> Self {
        let sanitizer = ContentSanitizer::new(FieldClassifier::new(catalog));
        let orchestrator = CloneOrchestrator::new(store.clone(), sanitizer);
        Self {
            store,
            orchestrator,
        }
    }

    pub fn store(&self) -> &Arc<dyn EngagementStore> {
        &self.store
    }

    // --- Write ---

    pub fn clone_engagement(&self, request: &CloneRequest) -> CloneOutcome<CloneResult> {
        self.orchestrator.clone_engagement(request)
    }

    pub fn clone_detailed(&self, request: &CloneRequest) -> CloneOutcome<CloneReport> {
        self.orchestrator.clone_detailed(request)
    }

    // --- Lineage reads ---

    pub fn lineage(&self, engagement_id: &str) -> LineageResult<LineageView> {
        self.orchestrator
            .lineage()
            .get_lineage(&EngagementId::from(engagement_id))
    }

    /// Parent, self, then children, for ancestry display
    pub fn lineage_nodes(&self, engagement_id: &str) -> LineageResult<Vec<LineageNode>> {
        self.lineage(engagement_id).map(LineageView::into_nodes)
    }

    pub fn lineage_stats(&self, engagement_id: &str) -> LineageResult<LineageStats> {
        self.orchestrator
            .lineage()
            .get_stats(&EngagementId::from(engagement_id))
    }

    // --- Stateless content operations ---

    pub fn classify(
        &self,
        content: &Map<String, Value>,
        template_id: Option<&str>,
    ) -> Classification {
        self.sanitizer().classifier().classify(content, template_id)
    }

    pub fn sanitize_structured(
        &self,
        content: &Map<String, Value>,
        template_id: Option<&str>,
        fields_to_clear: Option<&[String]>,
    ) -> SanitizedContent {
        self.sanitizer()
            .sanitize_structured(content, template_id, fields_to_clear)
    }

    pub fn sanitize_text(&self, text: &str) -> String {
        self.sanitizer().sanitize_text(text)
    }

    fn sanitizer(&self) -> &ContentSanitizer {
        self.orchestrator.sanitizer()
    }
}
