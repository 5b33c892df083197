//! Merging collection and user requirements into consolidated lists.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use eebuild_common::config::IntrospectConfig;
use eebuild_common::constants::BUILTIN_PYTHON_EXCLUSIONS;
use eebuild_common::error::{BuilderError, Result};
use eebuild_common::types::{RequirementKind, RequirementSource};

use crate::collection::{Collection, discover};
use crate::exclusion::Exclusions;
use crate::requirement::{Requirement, parse_requirements};

/// Consolidated requirements, one ordered list per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    /// Python requirements in scan order, user requirements last.
    pub python: Vec<Requirement>,
    /// System requirements in scan order, user requirements last.
    pub system: Vec<Requirement>,
}

impl Requirements {
    /// Returns the list for `kind`.
    #[must_use]
    pub fn get(&self, kind: RequirementKind) -> &[Requirement] {
        match kind {
            RequirementKind::Python => &self.python,
            RequirementKind::System => &self.system,
        }
    }
}

/// Combines collection requirements with user requirements and exclusions.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    exclusions: Exclusions,
    user: Vec<Requirement>,
}

impl Aggregator {
    /// Creates an aggregator applying `exclusions`.
    #[must_use]
    pub fn new(exclusions: Exclusions) -> Self {
        Self {
            exclusions,
            user: Vec::new(),
        }
    }

    /// Appends user requirements. They go after every collection requirement
    /// of the same kind.
    #[must_use]
    pub fn with_user_requirements(mut self, requirements: Vec<Requirement>) -> Self {
        self.user.extend(requirements);
        self
    }

    /// Builds the consolidated lists for `collections`, in the given order.
    ///
    /// Entries are dropped when excluded by name, by collection, or (for
    /// Python requirements declared by collections) by the built-in list.
    /// Repeats of the same specifier from the same source are dropped; the
    /// same package from different sources is kept once per source.
    #[must_use]
    pub fn aggregate(&self, collections: &[Collection]) -> Requirements {
        Requirements {
            python: self.aggregate_kind(collections, RequirementKind::Python),
            system: self.aggregate_kind(collections, RequirementKind::System),
        }
    }

    fn aggregate_kind(&self, collections: &[Collection], kind: RequirementKind) -> Vec<Requirement> {
        let declared = collections
            .iter()
            .flat_map(|collection| collection.requirements(kind));
        let user = self
            .user
            .iter()
            .filter(|requirement| requirement.kind == kind)
            .cloned();

        let mut seen = HashSet::new();
        declared
            .chain(user)
            .filter(|requirement| {
                if is_builtin_exclusion(requirement) {
                    tracing::debug!(
                        requirement = %requirement.specifier,
                        source = %requirement.source,
                        "dropping requirement already provided by the environment"
                    );
                    return false;
                }
                if self.exclusions.excludes(requirement) {
                    tracing::debug!(
                        requirement = %requirement.specifier,
                        source = %requirement.source,
                        "dropping excluded requirement"
                    );
                    return false;
                }
                seen.insert((requirement.specifier.clone(), requirement.source.clone()))
            })
            .collect()
    }
}

fn is_builtin_exclusion(requirement: &Requirement) -> bool {
    requirement.kind == RequirementKind::Python
        && requirement.source != RequirementSource::User
        && BUILTIN_PYTHON_EXCLUSIONS.contains(&requirement.name.as_str())
}

/// Reads a user requirements file of `kind`, attributing every entry to `user`.
///
/// # Errors
///
/// Returns [`BuilderError::MissingInput`] if the file does not exist, or
/// [`BuilderError::Io`] if it cannot be read.
pub fn read_user_requirements(path: &Path, kind: RequirementKind) -> Result<Vec<Requirement>> {
    if !path.is_file() {
        let what = match kind {
            RequirementKind::Python => "user pip requirements",
            RequirementKind::System => "user bindep requirements",
        };
        return Err(BuilderError::missing(what, path));
    }
    let text = fs::read_to_string(path).map_err(|e| BuilderError::io(path, e))?;
    Ok(parse_requirements(&text, kind, &RequirementSource::User, path))
}

/// Runs discovery and aggregation for `config`.
///
/// Every named input file is checked before the collection tree is scanned.
///
/// # Errors
///
/// Returns a configuration error for missing input files or a collections
/// path that is not a directory, and I/O errors from reading them.
pub fn collect_requirements(config: &IntrospectConfig) -> Result<Requirements> {
    let exclusions = Exclusions::load(config)?;
    let mut user = Vec::new();
    if let Some(path) = &config.user_python {
        user.extend(read_user_requirements(path, RequirementKind::Python)?);
    }
    if let Some(path) = &config.user_system {
        user.extend(read_user_requirements(path, RequirementKind::System)?);
    }

    let collections = discover(&config.collections_path)?;
    let requirements = Aggregator::new(exclusions)
        .with_user_requirements(user)
        .aggregate(&collections);
    tracing::info!(
        collections = collections.len(),
        python = requirements.python.len(),
        system = requirements.system.len(),
        "aggregated requirements"
    );
    Ok(requirements)
}

/// Renders a requirement file: one annotated line per entry and a final newline.
#[must_use]
pub fn render(requirements: &[Requirement]) -> Vec<String> {
    requirements
        .iter()
        .map(Requirement::render)
        .chain(std::iter::once(String::new()))
        .collect()
}

/// Writes `requirements` to `path` if the rendered text differs.
///
/// An empty list produces no file; a file left over from an earlier run is
/// removed. Returns whether the filesystem changed.
///
/// # Errors
///
/// Returns [`BuilderError::Io`] if the file cannot be written or removed.
pub fn write_requirements(path: &Path, requirements: &[Requirement]) -> Result<bool> {
    if requirements.is_empty() {
        tracing::info!(path = %path.display(), "no requirements to write");
        return eebuild_fs::remove_file(path);
    }
    eebuild_fs::write_file(path, &render(requirements))
}

/// Writes the output files named in `config`. Returns how many changed.
///
/// # Errors
///
/// Returns the first error from [`write_requirements`].
pub fn write_outputs(config: &IntrospectConfig, requirements: &Requirements) -> Result<usize> {
    let targets = [
        (config.write_python.as_deref(), RequirementKind::Python),
        (config.write_system.as_deref(), RequirementKind::System),
    ];
    let mut changed = 0;
    for (path, kind) in targets {
        if let Some(path) = path {
            if write_requirements(path, requirements.get(kind))? {
                changed += 1;
            }
        }
    }
    Ok(changed)
}
