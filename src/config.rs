//! Field catalog configuration
//!
//! The catalog is the immutable table of [`FieldDefinition`]s handed to the
//! classifier at construction. It is loaded once (YAML or JSON) and never
//! mutated afterwards.
//!
//! ```yaml
//! fields:
//!   - id: client_name
//!     label: Client Name
//!     category: client_sensitive
//!   - id: roi_target
//!     templates: [roi-analysis]
//!     category: client_sensitive
//! ```

use crate::model::{FieldCategory, FieldDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a field catalog
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field definition with empty id")]
    EmptyId,

    #[error("field '{0}' is declared both client-sensitive and preservable for the same template")]
    ConflictingCategory(String),

    #[error("unsupported catalog format: {0}")]
    UnknownFormat(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Deserialize, Serialize)]
struct CatalogFile {
    #[serde(default)]
    fields: Vec<FieldDefinition>,
}

/// Validated, immutable set of field definitions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldCatalog {
    definitions: Vec<FieldDefinition>,
}

impl FieldCatalog {
    /// Build a catalog, rejecting empty ids and category conflicts
    pub fn new(definitions: Vec<FieldDefinition>) -> ConfigResult<Self> {
        for (i, def) in definitions.iter().enumerate() {
            if def.id.trim().is_empty() {
                return Err(ConfigError::EmptyId);
            }
            let conflict = definitions[..i].iter().any(|earlier| {
                earlier.id == def.id && earlier.category != def.category && earlier.overlaps(def)
            });
            if conflict {
                return Err(ConfigError::ConflictingCategory(def.id.clone()));
            }
        }
        Ok(Self { definitions })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(s: &str) -> ConfigResult<Self> {
        let file: CatalogFile = serde_yaml::from_str(s)?;
        Self::new(file.fields)
    }

    pub fn from_json_str(s: &str) -> ConfigResult<Self> {
        let file: CatalogFile = serde_json::from_str(s)?;
        Self::new(file.fields)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            Some("json") => Self::from_json_str(&text),
            other => Err(ConfigError::UnknownFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Default table for the stock engagement templates
    pub fn builtin() -> Self {
        use FieldCategory::{ClientSensitive as S, Preservable as P};

        let def = |id: &str, label: &str, category, templates: &[&str]| {
            FieldDefinition::universal(id, category)
                .with_label(label)
                .for_templates(templates.iter().copied())
        };

        Self {
            definitions: vec![
                def("client_name", "Client Name", S, &[]),
                def("company_name", "Company Name", S, &[]),
                def("primary_contact", "Primary Contact", S, &[]),
                def("contact_email", "Contact Email", S, &[]),
                def("industry_notes", "Industry Notes", S, &["discovery"]),
                def("pain_points", "Pain Points", S, &["discovery"]),
                def("current_tools", "Current Tools", P, &["discovery"]),
                def("annual_budget", "Annual Budget", S, &["roi-analysis"]),
                def("hourly_rate", "Hourly Rate", S, &["roi-analysis"]),
                def("roi_formula", "ROI Formula", P, &["roi-analysis"]),
                def("process_steps", "Process Steps", P, &["process-map"]),
                def("process_automation_level", "Automation Level", P, &["process-map"]),
                def("bottlenecks", "Bottlenecks", P, &["process-map"]),
                def("timeline", "Timeline", S, &["implementation-plan"]),
                def("milestones", "Milestones", P, &["implementation-plan"]),
                def("success_criteria", "Success Criteria", P, &["implementation-plan"]),
                def("quote", "Client Quote", S, &["case-study"]),
                def("results_summary", "Results Summary", S, &["case-study"]),
                def("approach", "Approach", P, &["case-study"]),
            ],
        }
    }

    pub fn definitions(&self) -> &[FieldDefinition] {
        &self.definitions
    }

    /// Definitions applicable to a template (declared for it, or universal)
    pub fn applicable<'a>(
        &'a self,
        template_id: Option<&'a str>,
    ) -> impl Iterator<Item = &'a FieldDefinition> + 'a {
        self.definitions
            .iter()
            .filter(move |d| d.applies_to(template_id))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_yaml_catalog() {
        let catalog = FieldCatalog::from_yaml_str(
            r#"
fields:
  - id: client_name
    label: Client Name
    category: client_sensitive
  - id: roi_formula
    templates: [roi-analysis]
    category: preservable
"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.applicable(Some("discovery")).count(), 1);
        assert_eq!(catalog.applicable(Some("roi-analysis")).count(), 2);
    }

    #[test]
    fn loads_json_catalog() {
        let catalog = FieldCatalog::from_json_str(
            r#"{"fields": [{"id": "budget", "category": "client_sensitive"}]}"#,
        )
        .unwrap();
        assert_eq!(catalog.definitions()[0].id, "budget");
    }

    #[test]
    fn rejects_conflicting_categories_for_same_template() {
        let result = FieldCatalog::new(vec![
            FieldDefinition::universal("notes", FieldCategory::Preservable),
            FieldDefinition::universal("notes", FieldCategory::ClientSensitive)
                .for_templates(["discovery"]),
        ]);
        assert!(matches!(result, Err(ConfigError::ConflictingCategory(id)) if id == "notes"));
    }

    #[test]
    fn allows_same_id_with_disjoint_templates() {
        let catalog = FieldCatalog::new(vec![
            FieldDefinition::universal("summary", FieldCategory::Preservable)
                .for_templates(["process-map"]),
            FieldDefinition::universal("summary", FieldCategory::ClientSensitive)
                .for_templates(["case-study"]),
        ]);
        assert!(catalog.is_ok());
    }

    #[test]
    fn rejects_empty_id() {
        let result = FieldCatalog::new(vec![FieldDefinition::universal(
            " ",
            FieldCategory::Preservable,
        )]);
        assert!(matches!(result, Err(ConfigError::EmptyId)));
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let builtin = FieldCatalog::builtin();
        assert!(FieldCatalog::new(builtin.definitions().to_vec()).is_ok());
    }

    #[test]
    fn example_catalog_parses() {
        let catalog = FieldCatalog::from_yaml_str(include_str!("../fields.example.yaml")).unwrap();
        assert!(catalog
            .applicable(Some("roi-analysis"))
            .any(|d| d.id == "roi_formula" && d.category == FieldCategory::Preservable));
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.toml");
        std::fs::write(&path, "fields = []").unwrap();
        assert!(matches!(
            FieldCatalog::load(&path),
            Err(ConfigError::UnknownFormat(ext)) if ext == "toml"
        ));
    }

    #[test]
    fn load_reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.yml");
        std::fs::write(&path, "fields:\n  - id: budget\n    category: client_sensitive\n").unwrap();
        assert_eq!(FieldCatalog::load(&path).unwrap().len(), 1);
    }
}
