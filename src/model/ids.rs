//! String-backed identifiers for clients, engagements, and artifacts

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh UUID-based identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Wrap an existing identifier string
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of a client organization
    ClientId
);
string_id!(
    /// Identifier of an engagement (a piece of client work)
    EngagementId
);
string_id!(
    /// Identifier of an artifact belonging to an engagement
    ArtifactId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(EngagementId::generate(), EngagementId::generate());
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = ArtifactId::from("art-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"art-1\"");
        let back: ArtifactId = serde_json::from_str("\"art-1\"").unwrap();
        assert_eq!(back, id);
    }
}
