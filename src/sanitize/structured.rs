//! Clearing fields in structured content

use serde::Serialize;
use serde_json::{Map, Value};

/// Structured content after clearing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedContent {
    pub processed_content: Map<String, Value>,
    pub cleared_fields: Vec<String>,
    pub preserved_fields: Vec<String>,
}

/// Blank every key in `content` that `should_clear` selects.
///
/// Cleared values become `""` whatever their original type; the key stays.
pub(crate) fn clear_where<F>(content: &Map<String, Value>, mut should_clear: F) -> SanitizedContent
where
    F: FnMut(&str) -> bool,
{
    let mut out = SanitizedContent {
        processed_content: Map::with_capacity(content.len()),
        ..Default::default()
    };
    for (key, value) in content {
        if should_clear(key) {
            out.processed_content
                .insert(key.clone(), Value::String(String::new()));
            out.cleared_fields.push(key.clone());
        } else {
            out.processed_content.insert(key.clone(), value.clone());
            out.preserved_fields.push(key.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clears_any_value_type_to_empty_string() {
        let content = match json!({"a": 1, "b": true, "c": {"x": 1}, "d": "keep"}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        let out = clear_where(&content, |k| k != "d");
        assert_eq!(out.processed_content["a"], json!(""));
        assert_eq!(out.processed_content["b"], json!(""));
        assert_eq!(out.processed_content["c"], json!(""));
        assert_eq!(out.processed_content["d"], json!("keep"));
        assert_eq!(out.cleared_fields, vec!["a", "b", "c"]);
        assert_eq!(out.preserved_fields, vec!["d"]);
    }
}
