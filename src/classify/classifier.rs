//! Field classification over structured content

use super::patterns;
use crate::config::FieldCatalog;
use crate::model::FieldCategory;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of classifying the keys of one content map.
///
/// Lists follow the key order of the content map. Only `client_fields`
/// may be cleared automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub client_fields: Vec<String>,
    pub preservable_fields: Vec<String>,
    pub unclassified: Vec<String>,
}

/// Decides which content keys are client-sensitive and which are preservable.
///
/// Declared definitions from the injected catalog always win; key-name
/// patterns are consulted only for keys no applicable definition declares.
#[derive(Debug, Clone)]
pub struct FieldClassifier {
    catalog: Arc<FieldCatalog>,
}

impl FieldClassifier {
    pub fn new(catalog: Arc<FieldCatalog>) -> Self {
        Self { catalog }
    }

    pub fn classify(
        &self,
        content: &Map<String, Value>,
        template_id: Option<&str>,
    ) -> Classification {
        let declared: HashMap<&str, FieldCategory> = self
            .catalog
            .applicable(template_id)
            .map(|d| (d.id.as_str(), d.category))
            .collect();

        let mut result = Classification::default();
        for key in content.keys() {
            let category = declared
                .get(key.as_str())
                .copied()
                .or_else(|| patterns::match_key(key));
            match category {
                Some(FieldCategory::ClientSensitive) => result.client_fields.push(key.clone()),
                Some(FieldCategory::Preservable) => result.preservable_fields.push(key.clone()),
                None => result.unclassified.push(key.clone()),
            }
        }

        tracing::debug!(
            template = template_id.unwrap_or("<none>"),
            client = result.client_fields.len(),
            preservable = result.preservable_fields.len(),
            unclassified = result.unclassified.len(),
            "classified content fields"
        );
        result
    }
}
