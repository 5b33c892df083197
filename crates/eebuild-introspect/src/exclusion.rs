//! Package-name and collection exclusion lists.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use eebuild_common::config::IntrospectConfig;
use eebuild_common::error::{BuilderError, Result};
use eebuild_common::types::{RequirementKind, RequirementSource};

use crate::requirement::{Requirement, normalize_name};

/// Names and collections whose requirements are dropped from the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    python: HashSet<String>,
    system: HashSet<String>,
    collections: HashSet<String>,
}

impl Exclusions {
    /// Loads every exclusion file named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::MissingInput`] if a named file does not exist,
    /// or [`BuilderError::Io`] if it cannot be read.
    pub fn load(config: &IntrospectConfig) -> Result<Self> {
        let mut exclusions = Self::default();
        if let Some(path) = &config.exclude_python {
            for name in read_names(path, "pip exclusion", RequirementKind::Python)? {
                exclusions.exclude_package(RequirementKind::Python, &name);
            }
        }
        if let Some(path) = &config.exclude_system {
            for name in read_names(path, "bindep exclusion", RequirementKind::System)? {
                exclusions.exclude_package(RequirementKind::System, &name);
            }
        }
        if let Some(path) = &config.exclude_collections {
            for id in read_list(path, "collection exclusion")? {
                exclusions.exclude_collection(id);
            }
        }
        tracing::debug!(
            python = exclusions.python.len(),
            system = exclusions.system.len(),
            collections = exclusions.collections.len(),
            "loaded exclusions"
        );
        Ok(exclusions)
    }

    /// Drops every requirement of `kind` whose base name matches `name`.
    pub fn exclude_package(&mut self, kind: RequirementKind, name: &str) {
        let set = match kind {
            RequirementKind::Python => &mut self.python,
            RequirementKind::System => &mut self.system,
        };
        let _ = set.insert(normalize_name(kind, name));
    }

    /// Drops every requirement contributed by collection `id`.
    pub fn exclude_collection(&mut self, id: impl Into<String>) {
        let _ = self.collections.insert(id.into());
    }

    /// Whether `requirement` is excluded by name or by its collection.
    ///
    /// User requirements are only ever excluded by name.
    #[must_use]
    pub fn excludes(&self, requirement: &Requirement) -> bool {
        let names = match requirement.kind {
            RequirementKind::Python => &self.python,
            RequirementKind::System => &self.system,
        };
        if names.contains(&requirement.name) {
            return true;
        }
        match &requirement.source {
            RequirementSource::Collection(id) => self.collections.contains(&id.to_string()),
            RequirementSource::User => false,
        }
    }
}

/// Reads package exclusions, reducing each specifier line to its base name.
///
/// Lines without a usable package name are logged and skipped.
fn read_names(path: &Path, what: &'static str, kind: RequirementKind) -> Result<Vec<String>> {
    Ok(read_list(path, what)?
        .into_iter()
        .filter_map(
            |line| match Requirement::parse(&line, kind, RequirementSource::User) {
                Ok(requirement) => requirement.map(|r| r.name),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "skipping {what} entry: {e}");
                    None
                }
            },
        )
        .collect())
}

/// Reads a one-entry-per-line list, skipping blank lines and `#` comments.
fn read_list(path: &Path, what: &'static str) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(BuilderError::missing(what, path));
    }
    let text = fs::read_to_string(path).map_err(|e| BuilderError::io(path, e))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect())
}

#[cfg(test)]
mod tests {
    use eebuild_common::error::ErrorKind;
    use eebuild_common::types::CollectionId;

    use super::*;

    fn requirement(line: &str, kind: RequirementKind, source: RequirementSource) -> Requirement {
        Requirement::parse(line, kind, source)
            .expect("valid line")
            .expect("not blank")
    }

    fn from(id: &str) -> RequirementSource {
        RequirementSource::Collection(id.parse().expect("collection id"))
    }

    #[test]
    fn load_reads_all_three_lists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pip = dir.path().join("pip.txt");
        let bindep = dir.path().join("bindep.txt");
        let collections = dir.path().join("collections.txt");
        fs::write(&pip, "pytz\n\n  python_dateutil  \n").expect("write");
        fs::write(&bindep, "# system\nsubversion\n").expect("write");
        fs::write(&collections, "test.reqfile\n").expect("write");

        let config = IntrospectConfig {
            exclude_python: Some(pip),
            exclude_system: Some(bindep),
            exclude_collections: Some(collections),
            ..IntrospectConfig::new(dir.path())
        };
        let exclusions = Exclusions::load(&config).expect("load");

        assert!(exclusions.excludes(&requirement("pytz", RequirementKind::Python, from("a.b"))));
        assert!(exclusions.excludes(&requirement(
            "python-dateutil>=2.8.2",
            RequirementKind::Python,
            from("a.b")
        )));
        assert!(exclusions.excludes(&requirement(
            "subversion [platform:rpm]",
            RequirementKind::System,
            from("a.b")
        )));
        assert!(exclusions.excludes(&requirement(
            "jinja2",
            RequirementKind::Python,
            from("test.reqfile")
        )));
        assert!(!exclusions.excludes(&requirement("jinja2", RequirementKind::Python, from("a.b"))));
    }

    #[test]
    fn specifier_lines_exclude_by_base_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pip = dir.path().join("pip.txt");
        let bindep = dir.path().join("bindep.txt");
        fs::write(&pip, "pytz>=2020\nJinja2[i18n] ; python_version > '3'  # templating\n")
            .expect("write");
        fs::write(&bindep, "subversion [platform:rpm]\n").expect("write");

        let config = IntrospectConfig {
            exclude_python: Some(pip),
            exclude_system: Some(bindep),
            ..IntrospectConfig::new(dir.path())
        };
        let exclusions = Exclusions::load(&config).expect("load");

        assert!(exclusions.excludes(&requirement("pytz", RequirementKind::Python, from("a.b"))));
        assert!(exclusions.excludes(&requirement(
            "jinja2>=3.0",
            RequirementKind::Python,
            from("a.b")
        )));
        assert!(exclusions.excludes(&requirement(
            "subversion [platform:dpkg]",
            RequirementKind::System,
            from("a.b")
        )));
    }

    #[test]
    fn unusable_exclusion_lines_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pip = dir.path().join("pip.txt");
        fs::write(&pip, "-r other.txt\n>=1.0\npytz\n").expect("write");

        let config = IntrospectConfig {
            exclude_python: Some(pip),
            ..IntrospectConfig::new(dir.path())
        };
        let exclusions = Exclusions::load(&config).expect("load");

        assert!(exclusions.excludes(&requirement("pytz", RequirementKind::Python, from("a.b"))));
        assert!(!exclusions.excludes(&requirement("other", RequirementKind::Python, from("a.b"))));
    }

    #[test]
    fn missing_list_is_a_configuration_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = IntrospectConfig {
            exclude_collections: Some(dir.path().join("missing.txt")),
            ..IntrospectConfig::new(dir.path())
        };
        let err = Exclusions::load(&config).expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn user_requirements_ignore_collection_exclusions() {
        let mut exclusions = Exclusions::default();
        exclusions.exclude_collection("user");
        exclusions.exclude_collection(CollectionId::new("test", "reqfile").to_string());

        let user = requirement("pytest", RequirementKind::Python, RequirementSource::User);
        assert!(!exclusions.excludes(&user));
    }

    #[test]
    fn user_requirements_respect_name_exclusions() {
        let mut exclusions = Exclusions::default();
        exclusions.exclude_package(RequirementKind::Python, "PyTest");

        let user = requirement("pytest>=7", RequirementKind::Python, RequirementSource::User);
        assert!(exclusions.excludes(&user));
    }

    #[test]
    fn name_exclusions_are_per_kind() {
        let mut exclusions = Exclusions::default();
        exclusions.exclude_package(RequirementKind::System, "git");

        assert!(!exclusions.excludes(&requirement("git", RequirementKind::Python, from("a.b"))));
        assert!(exclusions.excludes(&requirement("git", RequirementKind::System, from("a.b"))));
    }
}
