//! Pack identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a pack identifier is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPackId {
    #[error("pack identifier must not be empty")]
    Empty,
    #[error("pack identifier {0:?} must not contain path separators")]
    PathSeparator(String),
    #[error("pack identifier {0:?} is not a usable directory name")]
    Reserved(String),
}

/// Opaque pack token supplied by the caller.
///
/// Used to build page URLs, as a substring filter on asset URLs and as the
/// name of the pack's output directory, so it must be non-empty and safe to
/// use as a single path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackId(String);

impl PackId {
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidPackId> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(InvalidPackId::Empty);
        }
        if trimmed.contains(['/', '\\']) {
            return Err(InvalidPackId::PathSeparator(id));
        }
        if trimmed == "." || trimmed == ".." {
            return Err(InvalidPackId::Reserved(id));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PackId {
    type Err = InvalidPackId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PackId {
    type Error = InvalidPackId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PackId> for String {
    fn from(id: PackId) -> Self {
        id.0
    }
}
