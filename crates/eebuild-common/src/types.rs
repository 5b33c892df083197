//! Domain primitive types used across the eebuild workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::USER_SOURCE;
use crate::error::BuilderError;

/// Identifier of a collection, written `namespace.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionId {
    namespace: String,
    name: String,
}

impl CollectionId {
    /// Creates a collection ID from its two components.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Returns the namespace component.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the name component.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl FromStr for CollectionId {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((namespace, name))
                if !namespace.is_empty() && !name.is_empty() && !name.contains('.') =>
            {
                Ok(Self::new(namespace, name))
            }
            _ => Err(BuilderError::Config {
                message: format!("collection identifier must be 'namespace.name', got '{s}'"),
            }),
        }
    }
}

impl TryFrom<String> for CollectionId {
    type Error = BuilderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CollectionId> for String {
    fn from(id: CollectionId) -> Self {
        id.to_string()
    }
}

/// Where a requirement came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequirementSource {
    /// Declared by a collection.
    Collection(CollectionId),
    /// Supplied by the user on the command line.
    User,
}

impl RequirementSource {
    /// Returns the collection ID, or `None` for user requirements.
    #[must_use]
    pub const fn collection(&self) -> Option<&CollectionId> {
        match self {
            Self::Collection(id) => Some(id),
            Self::User => None,
        }
    }
}

impl fmt::Display for RequirementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection(id) => write!(f, "{id}"),
            Self::User => f.write_str(USER_SOURCE),
        }
    }
}

/// The two families of requirements a collection can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    /// Python packages, pip requirements syntax.
    Python,
    /// System packages, bindep syntax.
    System,
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => f.write_str("python"),
            Self::System => f.write_str("system"),
        }
    }
}
