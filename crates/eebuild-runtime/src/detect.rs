//! Container runtime discovery on `PATH`.

use std::fmt;
use std::path::Path;

/// Container engines eebuild knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerRuntime {
    /// `podman`
    Podman,
    /// `docker`
    Docker,
}

impl ContainerRuntime {
    /// All supported runtimes, in order of preference.
    pub const ALL: [Self; 2] = [Self::Podman, Self::Docker];

    /// Executable name of the runtime.
    #[must_use]
    pub const fn binary(self) -> &'static str {
        match self {
            Self::Podman => "podman",
            Self::Docker => "docker",
        }
    }

    /// Maps a program name or path onto a runtime, if it is one.
    #[must_use]
    pub fn from_program(program: &str) -> Option<Self> {
        let name = Path::new(program).file_name()?.to_str()?;
        Self::ALL.into_iter().find(|runtime| runtime.binary() == name)
    }

    /// Whether the runtime's executable can be found on `PATH`.
    #[must_use]
    pub fn is_installed(self) -> bool {
        which::which(self.binary()).is_ok()
    }

    /// Returns the first installed runtime in order of preference.
    #[must_use]
    pub fn detect() -> Option<Self> {
        let found = Self::ALL.into_iter().find(|runtime| runtime.is_installed());
        tracing::debug!(runtime = ?found, "detected container runtime");
        found
    }
}

impl fmt::Display for ContainerRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Describes which runtimes are installed, e.g. `podman: installed, docker: not installed`.
#[must_use]
pub fn availability_summary() -> String {
    ContainerRuntime::ALL
        .into_iter()
        .map(|runtime| {
            let state = if runtime.is_installed() {
                "installed"
            } else {
                "not installed"
            };
            format!("{runtime}: {state}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_program_matches_bare_names_and_paths() {
        assert_eq!(
            ContainerRuntime::from_program("podman"),
            Some(ContainerRuntime::Podman)
        );
        assert_eq!(
            ContainerRuntime::from_program("/usr/bin/docker"),
            Some(ContainerRuntime::Docker)
        );
        assert_eq!(ContainerRuntime::from_program("buildah"), None);
        assert_eq!(ContainerRuntime::from_program(""), None);
    }

    #[test]
    fn summary_lists_every_runtime() {
        let summary = availability_summary();
        assert!(summary.starts_with("podman: "));
        assert!(summary.contains(", docker: "));
        assert!(summary.ends_with("installed"));
    }

    #[test]
    fn detect_returns_an_installed_runtime() {
        if let Some(runtime) = ContainerRuntime::detect() {
            assert!(runtime.is_installed());
        }
    }
}
