//! Field classification: client-sensitive vs. preservable content keys

mod classifier;
mod patterns;

pub use classifier::{Classification, FieldClassifier};
pub use patterns::match_key;
