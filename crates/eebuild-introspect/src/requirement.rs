//! Requirement lines and package-name normalization.
//!
//! Python lines follow pip's requirements-file conventions, system lines
//! follow bindep's. Only the leading package name is interpreted; the rest
//! of the specifier is carried through untouched.

use std::path::Path;

use eebuild_common::constants::PROVENANCE_PREFIX;
use eebuild_common::types::{RequirementKind, RequirementSource};
use thiserror::Error;

/// Why a requirement line was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    /// pip options such as `-r other.txt` or `--index-url`.
    #[error("pip options are not supported: {0}")]
    PipOption(String),
    /// The line does not begin with a package name.
    #[error("no package name at the start of '{0}'")]
    MissingName(String),
}

/// One requirement together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// The requirement as written, comment and surrounding whitespace removed.
    pub specifier: String,
    /// Normalized base package name, used for exclusion matching.
    pub name: String,
    /// Origin of the requirement.
    pub source: RequirementSource,
    /// Python or system requirement.
    pub kind: RequirementKind,
}

impl Requirement {
    /// Parses a single line.
    ///
    /// Returns `Ok(None)` for blank and comment-only lines.
    ///
    /// # Errors
    ///
    /// Returns a [`LineError`] when the line carries something other than a
    /// package requirement.
    pub fn parse(
        line: &str,
        kind: RequirementKind,
        source: RequirementSource,
    ) -> Result<Option<Self>, LineError> {
        let specifier = match kind {
            RequirementKind::Python => strip_pip_comment(line),
            RequirementKind::System => line.split('#').next().unwrap_or_default(),
        }
        .trim();
        if specifier.is_empty() {
            return Ok(None);
        }

        let raw_name = match kind {
            RequirementKind::Python => {
                if specifier.starts_with('-') {
                    return Err(LineError::PipOption(specifier.to_owned()));
                }
                python_name(specifier)
            }
            RequirementKind::System => specifier
                .split_whitespace()
                .next()
                .filter(|token| !token.starts_with('[')),
        }
        .ok_or_else(|| LineError::MissingName(specifier.to_owned()))?;

        Ok(Some(Self {
            specifier: specifier.to_owned(),
            name: normalize_name(kind, raw_name),
            source,
            kind,
        }))
    }

    /// Renders the requirement as an output line with its provenance.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{}{PROVENANCE_PREFIX}{}", self.specifier, self.source)
    }
}

/// Parses every line of `text`, logging and skipping the ones that are malformed.
///
/// `origin` only appears in log messages.
pub fn parse_requirements(
    text: &str,
    kind: RequirementKind,
    source: &RequirementSource,
    origin: &Path,
) -> Vec<Requirement> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| {
            match Requirement::parse(line, kind, source.clone()) {
                Ok(requirement) => requirement,
                Err(e) => {
                    tracing::warn!(
                        path = %origin.display(),
                        line = index + 1,
                        source = %source,
                        "skipping requirement: {e}"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Normalizes a package name the way its ecosystem compares names.
///
/// Python names are case-insensitive and treat runs of `-`, `_` and `.` as
/// one `-`. System names are compared as written.
#[must_use]
pub fn normalize_name(kind: RequirementKind, name: &str) -> String {
    match kind {
        RequirementKind::Python => canonical_python_name(name),
        RequirementKind::System => name.to_owned(),
    }
}

fn canonical_python_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                canonical.push('-');
            }
            in_separator = true;
        } else {
            canonical.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }
    canonical
}

/// Cuts a pip comment: `#` at the start of the line or after whitespace.
fn strip_pip_comment(line: &str) -> &str {
    let mut after_whitespace = true;
    for (index, c) in line.char_indices() {
        if c == '#' && after_whitespace {
            return &line[..index];
        }
        after_whitespace = c.is_whitespace();
    }
    line
}

/// Package name of a pip specifier.
///
/// A bare URL such as `git+https://host/repo.git#egg=name` is named by its
/// `egg` fragment and has no name without one; `name @ url` is named as usual.
fn python_name(specifier: &str) -> Option<&str> {
    let first = specifier.split_whitespace().next().unwrap_or_default();
    match first.split_once("://") {
        Some((scheme, _)) if !scheme.contains('@') => {
            let (_, egg) = first.split_once("#egg=")?;
            pip_name(egg)
        }
        _ => pip_name(specifier),
    }
}

/// Leading `[A-Za-z0-9][A-Za-z0-9._-]*` of a pip specifier.
fn pip_name(specifier: &str) -> Option<&str> {
    let end = specifier
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(specifier.len());
    let name = &specifier[..end];
    name.starts_with(|c: char| c.is_ascii_alphanumeric())
        .then_some(name)
}
