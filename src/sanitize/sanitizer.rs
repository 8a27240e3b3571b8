//! ContentSanitizer: structured clearing, text redaction, artifact processing

use super::structured::{clear_where, SanitizedContent};
use super::text;
use crate::classify::FieldClassifier;
use crate::model::{Artifact, ArtifactContent};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Reported cleared/preserved name for a free-text body
pub const TEXT_BODY_FIELD: &str = "text_content";

/// An artifact after sanitization, with the provenance stamp applied
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedArtifact {
    pub artifact: Artifact,
    pub cleared_fields: Vec<String>,
    pub preserved_fields: Vec<String>,
}

/// Clears classified fields from structured content and redacts free text.
#[derive(Debug, Clone)]
pub struct ContentSanitizer {
    classifier: FieldClassifier,
}

impl ContentSanitizer {
    pub fn new(classifier: FieldClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &FieldClassifier {
        &self.classifier
    }

    /// Clear fields from a content map.
    ///
    /// With `fields_to_clear`, exactly the named keys present in `content`
    /// are cleared and absent names are ignored. Without it, the classifier's
    /// client fields for `template_id` are cleared; unclassified keys are kept.
    pub fn sanitize_structured(
        &self,
        content: &Map<String, Value>,
        template_id: Option<&str>,
        fields_to_clear: Option<&[String]>,
    ) -> SanitizedContent {
        let targets: HashSet<String> = match fields_to_clear {
            Some(fields) => fields.iter().cloned().collect(),
            None => self
                .classifier
                .classify(content, template_id)
                .client_fields
                .into_iter()
                .collect(),
        };
        clear_where(content, |key| targets.contains(key))
    }

    /// Redact emails, phone numbers, and company names from free text
    pub fn sanitize_text(&self, text: &str) -> String {
        text::redact(text)
    }

    /// Sanitize one artifact and stamp its provenance with the current time
    pub fn process_artifact(
        &self,
        artifact: &Artifact,
        clear_client_data: bool,
        explicit_fields_to_clear: Option<&[String]>,
    ) -> ProcessedArtifact {
        self.process_artifact_at(artifact, clear_client_data, explicit_fields_to_clear, Utc::now())
    }

    /// Like [`process_artifact`](Self::process_artifact) with a caller-supplied stamp time
    pub fn process_artifact_at(
        &self,
        artifact: &Artifact,
        clear_client_data: bool,
        explicit_fields_to_clear: Option<&[String]>,
        cloned_at: DateTime<Utc>,
    ) -> ProcessedArtifact {
        let (content, cleared_fields, preserved_fields) =
            match ArtifactContent::resolve(artifact.content.as_deref()) {
                ArtifactContent::Structured(map) if clear_client_data => {
                    let out = self.sanitize_structured(
                        &map,
                        Some(artifact.template_id.as_str()),
                        explicit_fields_to_clear,
                    );
                    (
                        ArtifactContent::Structured(out.processed_content),
                        out.cleared_fields,
                        out.preserved_fields,
                    )
                }
                ArtifactContent::Structured(map) => {
                    let preserved = map.keys().cloned().collect();
                    (ArtifactContent::Structured(map), Vec::new(), preserved)
                }
                ArtifactContent::Text(body) if clear_client_data => (
                    ArtifactContent::Text(text::redact(&body)),
                    vec![TEXT_BODY_FIELD.to_string()],
                    Vec::new(),
                ),
                ArtifactContent::Text(body) => (
                    ArtifactContent::Text(body),
                    Vec::new(),
                    vec![TEXT_BODY_FIELD.to_string()],
                ),
                ArtifactContent::Empty => (ArtifactContent::Empty, Vec::new(), Vec::new()),
            };

        let mut processed = artifact.clone();
        // Untouched content keeps its exact original bytes
        if clear_client_data && !matches!(content, ArtifactContent::Empty) {
            processed.content = content.into_raw();
        }
        processed.metadata.cloned_from = Some(artifact.id.clone());
        processed.metadata.cloned_at = Some(cloned_at);

        ProcessedArtifact {
            artifact: processed,
            cleared_fields,
            preserved_fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldCatalog;
    use crate::model::{
        ArtifactId, ArtifactMetadata, ArtifactStatus, EngagementId, FieldCategory, FieldDefinition,
    };
    use serde_json::json;
    use std::sync::Arc;

    fn sanitizer() -> ContentSanitizer {
        let catalog = FieldCatalog::new(vec![
            FieldDefinition::universal("client_name", FieldCategory::ClientSensitive)
                .for_templates(["discovery"]),
            FieldDefinition::universal("process_automation_level", FieldCategory::Preservable)
                .for_templates(["discovery"]),
        ])
        .unwrap();
        ContentSanitizer::new(FieldClassifier::new(Arc::new(catalog)))
    }

    fn artifact(content: Option<&str>) -> Artifact {
        Artifact {
            id: ArtifactId::from("art-1"),
            engagement_id: EngagementId::from("eng-1"),
            template_id: "discovery".into(),
            title: "Discovery notes".into(),
            content: content.map(String::from),
            status: ArtifactStatus::Final,
            version: 4,
            metadata: ArtifactMetadata::default(),
            created_at: Utc::now(),
        }
    }

    fn example_content() -> Map<String, Value> {
        match json!({
            "client_name": "Acme",
            "process_automation_level": 80,
            "notes": "call John at john@acme.com"
        }) {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn structured_with_classifier_clears_only_client_fields() {
        let out = sanitizer().sanitize_structured(&example_content(), Some("discovery"), None);
        assert_eq!(out.processed_content["client_name"], json!(""));
        assert_eq!(out.processed_content["process_automation_level"], json!(80));
        assert_eq!(out.processed_content["notes"], json!("call John at john@acme.com"));
        assert_eq!(out.cleared_fields, vec!["client_name"]);
        assert_eq!(out.preserved_fields.len(), 2);
    }

    #[test]
    fn structured_with_explicit_list_clears_intersection() {
        let content = example_content();
        let fields = vec!["notes".to_string(), "missing".to_string()];
        let out =
            sanitizer().sanitize_structured(&content, Some("discovery"), Some(fields.as_slice()));
        assert_eq!(out.cleared_fields, vec!["notes"]);
        assert_eq!(out.processed_content["client_name"], json!("Acme"));
        assert!(!out.processed_content.contains_key("missing"));
        assert_eq!(
            out.cleared_fields.len() + out.preserved_fields.len(),
            content.len()
        );
    }

    #[test]
    fn structured_with_empty_explicit_list_clears_nothing() {
        let out =
            sanitizer().sanitize_structured(&example_content(), Some("discovery"), Some(&[][..]));
        assert!(out.cleared_fields.is_empty());
        assert_eq!(out.preserved_fields.len(), 3);
    }

    #[test]
    fn process_structured_artifact_with_clearing() {
        let raw = Value::Object(example_content()).to_string();
        let out = sanitizer().process_artifact(&artifact(Some(raw.as_str())), true, None);
        assert_eq!(out.cleared_fields, vec!["client_name"]);
        let content: Value =
            serde_json::from_str(out.artifact.content.as_deref().unwrap()).unwrap();
        assert_eq!(content["client_name"], json!(""));
        assert_eq!(out.artifact.metadata.cloned_from, Some(ArtifactId::from("art-1")));
        assert!(out.artifact.metadata.cloned_at.is_some());
    }

    #[test]
    fn process_structured_artifact_without_clearing_reports_all_preserved() {
        let raw = r#"{ "client_name": "Acme", "notes": "x" }"#;
        let out = sanitizer().process_artifact(&artifact(Some(raw)), false, None);
        assert!(out.cleared_fields.is_empty());
        assert_eq!(out.preserved_fields, vec!["client_name", "notes"]);
        assert_eq!(out.artifact.content.as_deref(), Some(raw));
        assert_eq!(out.artifact.metadata.cloned_from, Some(ArtifactId::from("art-1")));
    }

    #[test]
    fn process_text_artifact_redacts_and_reports_body() {
        let out = sanitizer().process_artifact(
            &artifact(Some("Reach jane@example.com at ACME Corp.")),
            true,
            None,
        );
        assert_eq!(out.artifact.content.as_deref(), Some("Reach [EMAIL] at [COMPANY]"));
        assert_eq!(out.cleared_fields, vec![TEXT_BODY_FIELD]);
        assert!(out.preserved_fields.is_empty());
    }

    #[test]
    fn process_text_artifact_without_clearing_is_untouched() {
        let text = "Reach jane@example.com";
        let out = sanitizer().process_artifact(&artifact(Some(text)), false, None);
        assert_eq!(out.artifact.content.as_deref(), Some(text));
        assert!(out.cleared_fields.is_empty());
        assert_eq!(out.preserved_fields, vec![TEXT_BODY_FIELD]);
    }

    #[test]
    fn process_null_content_never_fails() {
        for clear in [true, false] {
            let out = sanitizer().process_artifact(&artifact(None), clear, None);
            assert!(out.cleared_fields.is_empty());
            assert!(out.preserved_fields.is_empty());
            assert_eq!(out.artifact.content, None);
            assert!(out.artifact.metadata.cloned_at.is_some());
        }
    }

    #[test]
    fn blank_content_is_left_as_is() {
        let out = sanitizer().process_artifact(&artifact(Some("   ")), true, None);
        assert_eq!(out.artifact.content.as_deref(), Some("   "));
    }

    #[test]
    fn stamp_uses_supplied_time() {
        let at = Utc::now() - chrono::Duration::days(1);
        let out = sanitizer().process_artifact_at(&artifact(None), true, None, at);
        assert_eq!(out.artifact.metadata.cloned_at, Some(at));
    }
}
