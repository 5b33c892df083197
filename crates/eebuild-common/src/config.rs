//! Configuration model for a single introspection run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Every input the requirement aggregator needs.
///
/// Optional files that are named but missing are configuration errors;
/// unset ones are simply skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntrospectConfig {
    /// Directory holding the collections to scan.
    pub collections_path: PathBuf,
    /// Extra Python requirements attributed to the `user` source.
    pub user_python: Option<PathBuf>,
    /// Extra system requirements attributed to the `user` source.
    pub user_system: Option<PathBuf>,
    /// Python package names to drop.
    pub exclude_python: Option<PathBuf>,
    /// System package names to drop.
    pub exclude_system: Option<PathBuf>,
    /// Collection identifiers whose requirements are dropped.
    pub exclude_collections: Option<PathBuf>,
    /// Where to write the consolidated Python requirements.
    pub write_python: Option<PathBuf>,
    /// Where to write the consolidated system requirements.
    pub write_system: Option<PathBuf>,
}

impl IntrospectConfig {
    /// Creates a configuration scanning `collections_path` with nothing else set.
    #[must_use]
    pub fn new(collections_path: impl Into<PathBuf>) -> Self {
        Self {
            collections_path: collections_path.into(),
            ..Self::default()
        }
    }
}

impl Default for IntrospectConfig {
    fn default() -> Self {
        Self {
            collections_path: PathBuf::from(crate::constants::DEFAULT_COLLECTIONS_PATH),
            user_python: None,
            user_system: None,
            exclude_python: None,
            exclude_system: None,
            exclude_collections: None,
            write_python: None,
            write_system: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scans_the_system_collections_path() {
        let config = IntrospectConfig::default();
        assert_eq!(
            config.collections_path,
            PathBuf::from("/usr/share/ansible/collections")
        );
        assert!(config.write_python.is_none());
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: IntrospectConfig =
            serde_yaml::from_str("write_python: /out/requirements.txt\n").expect("parse");
        assert_eq!(
            config.write_python.as_deref(),
            Some(std::path::Path::new("/out/requirements.txt"))
        );
        assert_eq!(config.collections_path, IntrospectConfig::default().collections_path);
    }
}
