//! Key-name heuristics for fields no definition declares

use crate::model::FieldCategory;
use regex::Regex;
use std::sync::LazyLock;

/// Sensitive patterns, checked before any preservable pattern
static SENSITIVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)company",
        r"(?i)client",
        r"(?i)stakeholder",
        r"(?i)contact",
        r"(?i)budget",
        r"(?i)testimonial",
        r"(?i)name$",
    ])
});

static PRESERVABLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)process",
        r"(?i)workflow",
        r"(?i)criteria",
        r"(?i)automation",
        r"(?i)phase",
        r"(?i)implementation",
        r"(?i)technical",
        r"(?i)integration",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}

/// Classify a key by name alone. Sensitive wins when both sets match.
pub fn match_key(key: &str) -> Option<FieldCategory> {
    if SENSITIVE_PATTERNS.iter().any(|re| re.is_match(key)) {
        return Some(FieldCategory::ClientSensitive);
    }
    if PRESERVABLE_PATTERNS.iter().any(|re| re.is_match(key)) {
        return Some(FieldCategory::Preservable);
    }
    None
}
