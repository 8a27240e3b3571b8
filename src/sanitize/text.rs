//! Free-text redaction
//!
//! Substitutions run in a fixed order (email, phone, company) so an
//! earlier pattern never has its match partially consumed by a later one.

use regex::Regex;
use std::sync::LazyLock;

pub const EMAIL_PLACEHOLDER: &str = "[EMAIL]";
pub const PHONE_PLACEHOLDER: &str = "[PHONE]";
pub const COMPANY_PLACEHOLDER: &str = "[COMPANY]";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

// (555) 123-4567, 555-123-4567, 555.123.4567, 555 123 4567, +1 555 123 4567
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?1[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b")
        .expect("valid phone regex")
});

// One or more capitalized words followed by a corporate suffix, on one line
static COMPANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[A-Z][A-Za-z0-9&'-]*[ \t]+)+(?:Inc\.|Corp\.|Ltd\.|LLC\b)")
        .expect("valid company regex")
});

/// Replace emails, phone numbers, and company names with placeholders.
///
/// Text with no matches is returned unchanged.
pub fn redact(text: &str) -> String {
    let text = EMAIL.replace_all(text, EMAIL_PLACEHOLDER);
    let text = PHONE.replace_all(&text, PHONE_PLACEHOLDER);
    let text = COMPANY.replace_all(&text, COMPANY_PLACEHOLDER);
    text.into_owned()
}
