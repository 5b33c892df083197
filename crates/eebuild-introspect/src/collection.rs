//! Collection discovery and dependency declarations.
//!
//! A collection lives at `<root>/<namespace>/<name>` (or under
//! `<root>/ansible_collections/` for an installed collections path). Its
//! dependency files are named by `meta/execution-environment.yml`; without
//! that file, `requirements.txt` and `bindep.txt` at the collection root are
//! used when present.

use std::fs;
use std::path::{Component, Path, PathBuf};

use eebuild_common::constants::{
    COLLECTIONS_DIR, DEFAULT_PYTHON_FILE, DEFAULT_SYSTEM_FILE, EE_METADATA_FILES, META_DIR,
};
use eebuild_common::error::{BuilderError, Result};
use eebuild_common::types::{CollectionId, RequirementKind, RequirementSource};
use serde::Deserialize;

use crate::requirement::{Requirement, parse_requirements};

/// Shape of `meta/execution-environment.yml`. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct EnvironmentMetadata {
    #[serde(default)]
    dependencies: Option<Dependencies>,
}

#[derive(Debug, Default, Deserialize)]
struct Dependencies {
    #[serde(default)]
    python: Option<FileList>,
    #[serde(default)]
    system: Option<FileList>,
}

/// A single file name or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileList {
    One(String),
    Many(Vec<String>),
}

impl FileList {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(file) => vec![file],
            Self::Many(files) => files,
        }
    }
}

/// An installed collection and the dependency files it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// `namespace.name` identifier.
    pub id: CollectionId,
    /// Collection root directory.
    pub path: PathBuf,
    /// Python requirement files, in declaration order.
    pub python_files: Vec<PathBuf>,
    /// System requirement files, in declaration order.
    pub system_files: Vec<PathBuf>,
}

impl Collection {
    /// Reads the dependency declarations of the collection at `path`.
    ///
    /// Malformed metadata and unusable file references are logged and
    /// dropped; the collection then declares nothing of that kind.
    #[must_use]
    pub fn load(id: CollectionId, path: PathBuf) -> Self {
        let mut collection = Self {
            id,
            path,
            python_files: Vec::new(),
            system_files: Vec::new(),
        };

        match collection.read_metadata() {
            Ok(Some(dependencies)) => {
                collection.python_files = collection.resolve_files(dependencies.python);
                collection.system_files = collection.resolve_files(dependencies.system);
            }
            Ok(None) => {
                collection.python_files = collection.inferred_file(DEFAULT_PYTHON_FILE);
                collection.system_files = collection.inferred_file(DEFAULT_SYSTEM_FILE);
            }
            Err(e) => {
                tracing::warn!(collection = %collection.id, "ignoring collection metadata: {e}");
            }
        }
        collection
    }

    /// Returns the declared files of `kind`.
    #[must_use]
    pub fn files(&self, kind: RequirementKind) -> &[PathBuf] {
        match kind {
            RequirementKind::Python => &self.python_files,
            RequirementKind::System => &self.system_files,
        }
    }

    /// Reads every requirement of `kind`, in file and line order.
    ///
    /// Unreadable files and malformed lines are logged and skipped.
    #[must_use]
    pub fn requirements(&self, kind: RequirementKind) -> Vec<Requirement> {
        let source = RequirementSource::Collection(self.id.clone());
        let mut requirements = Vec::new();
        for file in self.files(kind) {
            match fs::read_to_string(file) {
                Ok(text) => requirements.extend(parse_requirements(&text, kind, &source, file)),
                Err(e) => {
                    tracing::warn!(
                        collection = %self.id,
                        path = %file.display(),
                        "skipping unreadable requirements file: {e}"
                    );
                }
            }
        }
        requirements
    }

    /// Parses the metadata file, if the collection has one.
    fn read_metadata(&self) -> Result<Option<Dependencies>> {
        let meta_dir = self.path.join(META_DIR);
        let Some(meta_file) = EE_METADATA_FILES
            .iter()
            .map(|name| meta_dir.join(name))
            .find(|candidate| candidate.is_file())
        else {
            return Ok(None);
        };

        let text = fs::read_to_string(&meta_file).map_err(|e| BuilderError::io(&meta_file, e))?;
        if text.trim().is_empty() {
            return Ok(Some(Dependencies::default()));
        }
        let metadata: Option<EnvironmentMetadata> =
            serde_yaml::from_str(&text).map_err(|e| BuilderError::Metadata {
                path: meta_file.clone(),
                message: e.to_string(),
            })?;
        tracing::debug!(collection = %self.id, path = %meta_file.display(), "read metadata");
        Ok(Some(
            metadata
                .and_then(|metadata| metadata.dependencies)
                .unwrap_or_default(),
        ))
    }

    /// Turns declared relative file names into checked paths.
    fn resolve_files(&self, declared: Option<FileList>) -> Vec<PathBuf> {
        declared
            .map(FileList::into_vec)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|name| {
                let relative = Path::new(&name);
                let escapes = relative.is_absolute()
                    || relative
                        .components()
                        .any(|component| matches!(component, Component::ParentDir));
                if escapes {
                    tracing::warn!(
                        collection = %self.id,
                        file = %name,
                        "ignoring dependency file outside of the collection"
                    );
                    return None;
                }
                let path = self.path.join(relative);
                if path.is_file() {
                    Some(path)
                } else {
                    tracing::warn!(
                        collection = %self.id,
                        path = %path.display(),
                        "declared dependency file does not exist"
                    );
                    None
                }
            })
            .collect()
    }

    /// The conventional file `name` at the collection root, if it has content.
    fn inferred_file(&self, name: &str) -> Vec<PathBuf> {
        let path = self.path.join(name);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => vec![path],
            _ => Vec::new(),
        }
    }
}

/// Finds every collection under `root`, sorted by namespace then name.
///
/// If `root` contains an `ansible_collections` directory, that directory is
/// scanned instead.
///
/// # Errors
///
/// Returns [`BuilderError::NotADirectory`] if `root` is not a directory, or
/// [`BuilderError::Io`] if a directory cannot be listed.
pub fn discover(root: &Path) -> Result<Vec<Collection>> {
    if !root.is_dir() {
        return Err(BuilderError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    let nested = root.join(COLLECTIONS_DIR);
    let base = if nested.is_dir() {
        nested
    } else {
        root.to_path_buf()
    };
    tracing::info!(path = %base.display(), "scanning for collections");

    let mut collections = Vec::new();
    for (namespace, namespace_path) in sorted_subdirectories(&base)? {
        for (name, path) in sorted_subdirectories(&namespace_path)? {
            let collection = Collection::load(CollectionId::new(namespace.as_str(), name), path);
            tracing::debug!(
                collection = %collection.id,
                python = collection.python_files.len(),
                system = collection.system_files.len(),
                "found collection"
            );
            collections.push(collection);
        }
    }
    Ok(collections)
}

/// Lists child directories usable as identifier components, sorted by name.
fn sorted_subdirectories(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| BuilderError::io(dir, e))?;
    let mut children = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BuilderError::io(dir, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!(path = %path.display(), "skipping directory with a non UTF-8 name");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if name.contains('.') {
            tracing::warn!(path = %path.display(), "skipping directory with '.' in its name");
            continue;
        }
        children.push((name, path));
    }
    children.sort();
    Ok(children)
}
