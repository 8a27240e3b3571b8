//! Content sanitization for cloned artifacts

mod sanitizer;
mod structured;
mod text;

pub use sanitizer::{ContentSanitizer, ProcessedArtifact, TEXT_BODY_FIELD};
pub use structured::SanitizedContent;
pub use text::{COMPANY_PLACEHOLDER, EMAIL_PLACEHOLDER, PHONE_PLACEHOLDER};
