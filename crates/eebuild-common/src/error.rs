//! Unified error types for the eebuild workspace.
//!
//! Every library crate returns [`BuilderError`]; the binary wraps it in
//! `anyhow` at the process boundary. Callers that need to branch on the
//! failure use [`BuilderError::kind`] rather than the rendered message.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Coarse classification of a [`BuilderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced input is missing or invalid. Fatal for the run.
    Configuration,
    /// A copy operation was pointed at a directory. Fatal for that copy.
    FilesystemConflict,
    /// An external program is missing or exited unsuccessfully.
    ExternalCommand,
    /// Collection metadata could not be understood. Recoverable.
    Metadata,
    /// A document could not be serialized.
    Serialization,
    /// Any other filesystem failure.
    Io,
}

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A file named on the command line or in configuration does not exist.
    #[error("{what} file not found: {path}")]
    MissingInput {
        /// Role of the missing file (e.g. "pip exclusion").
        what: &'static str,
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A path that must be a directory is something else.
    #[error("Expected a directory at '{path}'")]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A copy source or destination is a directory.
    #[error("{role} {path} can not be a directory")]
    DirectoryConflict {
        /// Either "source" or "destination".
        role: &'static str,
        /// Offending path.
        path: PathBuf,
    },

    /// An executable could not be found.
    #[error("You do not have {program} installed.{detail}")]
    CommandNotFound {
        /// Program that was requested.
        program: String,
        /// Extra diagnostic text, empty when there is nothing to add.
        detail: String,
    },

    /// An executable exited with a nonzero status.
    #[error("An error occurred (rc={code}) running {program}, see output line(s) above for details.")]
    CommandFailed {
        /// Program that was run.
        program: String,
        /// Exit code, `-1` when terminated by a signal.
        code: i32,
    },

    /// Collection metadata is malformed.
    #[error("invalid metadata in {path}: {message}")]
    Metadata {
        /// Metadata file that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl BuilderError {
    /// Wraps an I/O error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Builds a [`BuilderError::MissingInput`] for `path`.
    pub fn missing(what: &'static str, path: &Path) -> Self {
        Self::MissingInput {
            what,
            path: path.to_path_buf(),
        }
    }

    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput { .. } | Self::NotADirectory { .. } | Self::Config { .. } => {
                ErrorKind::Configuration
            }
            Self::DirectoryConflict { .. } => ErrorKind::FilesystemConflict,
            Self::CommandNotFound { .. } | Self::CommandFailed { .. } => {
                ErrorKind::ExternalCommand
            }
            Self::Metadata { .. } => ErrorKind::Metadata,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BuilderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_conflict_message_names_the_role() {
        let err = BuilderError::DirectoryConflict {
            role: "destination",
            path: PathBuf::from("/tmp"),
        };
        assert_eq!(err.to_string(), "destination /tmp can not be a directory");
        assert_eq!(err.kind(), ErrorKind::FilesystemConflict);
    }

    #[test]
    fn missing_input_is_a_configuration_error() {
        let err = BuilderError::missing("pip exclusion", Path::new("/nope/exclude.txt"));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("/nope/exclude.txt"));
    }

    #[test]
    fn command_not_found_appends_detail() {
        let err = BuilderError::CommandNotFound {
            program: "docker".into(),
            detail: "\npodman: not installed, docker: not installed".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("You do not have docker installed."));
        assert!(msg.ends_with("podman: not installed, docker: not installed"));
        assert_eq!(err.kind(), ErrorKind::ExternalCommand);
    }

    #[test]
    fn not_a_directory_is_a_configuration_error() {
        let err = BuilderError::NotADirectory {
            path: PathBuf::from("xyz"),
        };
        assert_eq!(err.to_string(), "Expected a directory at 'xyz'");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
