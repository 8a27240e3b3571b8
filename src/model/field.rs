//! Field definitions: which content attributes identify a client

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether a field identifies the client or captures reusable method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    ClientSensitive,
    Preservable,
}

/// A declared field and the templates it applies to
///
/// An empty `template_ids` set makes the definition universal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, alias = "templates")]
    pub template_ids: BTreeSet<String>,
    pub category: FieldCategory,
}

impl FieldDefinition {
    /// A definition that applies to every template
    pub fn universal(id: impl Into<String>, category: FieldCategory) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            template_ids: BTreeSet::new(),
            category,
        }
    }

    /// Restrict the definition to the given templates
    pub fn for_templates<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.template_ids = templates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn is_universal(&self) -> bool {
        self.template_ids.is_empty()
    }

    /// Whether this definition applies to `template_id`.
    ///
    /// With no template id only universal definitions apply.
    pub fn applies_to(&self, template_id: Option<&str>) -> bool {
        match template_id {
            _ if self.is_universal() => true,
            Some(t) => self.template_ids.contains(t),
            None => false,
        }
    }

    /// Whether two definitions could both apply to some template
    pub fn overlaps(&self, other: &FieldDefinition) -> bool {
        self.is_universal()
            || other.is_universal()
            || !self.template_ids.is_disjoint(&other.template_ids)
    }
}
