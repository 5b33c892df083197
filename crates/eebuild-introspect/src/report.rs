//! YAML summary of aggregated requirements, grouped by source.

use std::collections::BTreeMap;

use eebuild_common::error::Result;
use serde::Serialize;

use crate::aggregate::Requirements;
use crate::requirement::Requirement;

/// Requirement specifiers per kind, keyed by the source that declared them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntrospectReport {
    /// Python requirements by source.
    pub python: BTreeMap<String, Vec<String>>,
    /// System requirements by source.
    pub system: BTreeMap<String, Vec<String>>,
}

impl IntrospectReport {
    /// Groups the consolidated requirements by source.
    #[must_use]
    pub fn from_requirements(requirements: &Requirements) -> Self {
        Self {
            python: group(&requirements.python),
            system: group(&requirements.system),
        }
    }

    /// Serializes the report as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`eebuild_common::error::BuilderError::Serialization`] if
    /// serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn group(requirements: &[Requirement]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for requirement in requirements {
        grouped
            .entry(requirement.source.to_string())
            .or_default()
            .push(requirement.specifier.clone());
    }
    grouped
}

#[cfg(test)]
mod tests {
    use eebuild_common::types::{CollectionId, RequirementKind, RequirementSource};
    use pretty_assertions::assert_eq;

    use super::*;

    fn requirement(line: &str, kind: RequirementKind, source: RequirementSource) -> Requirement {
        Requirement::parse(line, kind, source)
            .expect("valid")
            .expect("not blank")
    }

    #[test]
    fn report_groups_by_source() {
        let bindep = RequirementSource::Collection(CollectionId::new("test", "bindep"));
        let metadata = RequirementSource::Collection(CollectionId::new("test", "metadata"));
        let requirements = Requirements {
            python: vec![
                requirement("pyvcloud>=14", RequirementKind::Python, metadata),
                requirement("pytest", RequirementKind::Python, RequirementSource::User),
            ],
            system: vec![
                requirement("subversion [platform:rpm]", RequirementKind::System, bindep.clone()),
                requirement("subversion [platform:dpkg]", RequirementKind::System, bindep),
            ],
        };

        let yaml = IntrospectReport::from_requirements(&requirements)
            .to_yaml()
            .expect("yaml");
        assert!(yaml.starts_with("python:\n"));

        let parsed: BTreeMap<String, BTreeMap<String, Vec<String>>> =
            serde_yaml::from_str(&yaml).expect("parse back");
        assert_eq!(parsed["python"]["test.metadata"], vec!["pyvcloud>=14"]);
        assert_eq!(parsed["python"]["user"], vec!["pytest"]);
        assert_eq!(
            parsed["system"]["test.bindep"],
            vec!["subversion [platform:rpm]", "subversion [platform:dpkg]"]
        );
    }

    #[test]
    fn empty_report_has_both_sections() {
        let yaml = IntrospectReport::default().to_yaml().expect("yaml");
        let parsed: BTreeMap<String, BTreeMap<String, Vec<String>>> =
            serde_yaml::from_str(&yaml).expect("parse back");
        assert_eq!(parsed.len(), 2);
        assert!(parsed.values().all(BTreeMap::is_empty));
    }
}
