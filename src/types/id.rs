//! Typed record identifiers.
//!
//! Each collection gets its own id newtype so a `ProjectId` can never be
//! passed where a `UserId` is expected. Ids serialize as plain strings.
//! Generated ids look like `project-3f2a...`; any non-empty string parses,
//! so seeded ids such as `admin-1` load unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error type for id parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("identifier cannot be empty")]
    Empty,
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix used for generated ids.
            pub const PREFIX: &'static str = $prefix;

            /// Generate a fresh, collision-free id.
            pub fn generate() -> Self {
                Self(format!("{}-{}", Self::PREFIX, Uuid::new_v4().simple()))
            }

            /// Borrow the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Short form for table output (prefix plus 8 characters).
            pub fn short(&self) -> &str {
                let cut = Self::PREFIX.len() + 1 + 8;
                if self.0.starts_with(Self::PREFIX) && self.0.len() > cut {
                    &self.0[..cut]
                } else {
                    &self.0
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                if s.is_empty() {
                    return Err(IdError::Empty);
                }
                Ok(Self(s.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

record_id!(
    /// Identifier of a [`User`](super::User).
    UserId,
    "user"
);
record_id!(
    /// Identifier of a [`Project`](super::Project).
    ProjectId,
    "project"
);
record_id!(
    /// Identifier of a [`Vulnerability`](super::Vulnerability).
    VulnerabilityId,
    "vuln"
);
record_id!(
    /// Identifier of a [`ScanResult`](super::ScanResult).
    ScanId,
    "scan"
);
