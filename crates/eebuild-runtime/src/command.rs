//! Running external programs with merged, logged output.

use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use eebuild_common::error::{BuilderError, Result};

use crate::detect::{ContainerRuntime, availability_summary};

/// How [`run_command`] treats output and failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Collect output lines into [`CommandOutput::lines`].
    pub capture_output: bool,
    /// Return a nonzero exit code instead of failing.
    pub allow_error: bool,
}

impl RunOptions {
    /// Options that collect output.
    #[must_use]
    pub const fn captured() -> Self {
        Self {
            capture_output: true,
            allow_error: false,
        }
    }

    /// Returns a copy that tolerates a nonzero exit.
    #[must_use]
    pub const fn allow_error(mut self) -> Self {
        self.allow_error = true;
        self
    }
}

/// Result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `-1` if the process was killed by a signal.
    pub code: i32,
    /// Output lines with trailing whitespace removed; empty unless captured.
    pub lines: Vec<String>,
}

impl CommandOutput {
    /// Returns true if the command exited with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs `argv`, streaming stdout and stderr (merged) to the debug log.
///
/// # Errors
///
/// - [`BuilderError::Config`] if `argv` is empty.
/// - [`BuilderError::CommandNotFound`] if the program does not exist. When
///   the program is a container runtime the message lists which runtimes
///   are installed.
/// - [`BuilderError::CommandFailed`] if the exit code is nonzero and
///   `allow_error` is not set.
/// - [`BuilderError::Io`] if the process cannot be spawned or read.
pub fn run_command<S: AsRef<OsStr>>(argv: &[S], options: RunOptions) -> Result<CommandOutput> {
    let Some((program, args)) = argv.split_first() else {
        return Err(BuilderError::Config {
            message: "cannot run an empty command".into(),
        });
    };
    let program_name = program.as_ref().to_string_lossy().into_owned();
    let io_error = |e: io::Error| BuilderError::io(PathBuf::from(&program_name), e);

    let command_line = argv
        .iter()
        .map(|arg| arg.as_ref().to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ");
    tracing::info!(command = %command_line, "running command");

    let (reader, writer) = io::pipe().map_err(io_error)?;
    let mut command = Command::new(program);
    let _ = command
        .args(args)
        .stdin(Stdio::null())
        .stdout(writer.try_clone().map_err(io_error)?)
        .stderr(writer);
    let spawned = command.spawn();
    // The command keeps its copies of the write end open until dropped.
    drop(command);

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(missing_program(&program_name));
        }
        Err(e) => return Err(io_error(e)),
    };

    let mut lines = Vec::new();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).map_err(io_error)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end();
        tracing::debug!(program = %program_name, "{line}");
        if options.capture_output {
            lines.push(line.to_owned());
        }
    }

    let status = child.wait().map_err(io_error)?;
    let code = status.code().unwrap_or(-1);
    if code != 0 && !options.allow_error {
        tracing::error!(
            program = %program_name,
            rc = code,
            "an error occurred, see output line(s) above for details"
        );
        return Err(BuilderError::CommandFailed {
            program: program_name,
            code,
        });
    }

    Ok(CommandOutput { code, lines })
}

fn missing_program(program: &str) -> BuilderError {
    let detail = if ContainerRuntime::from_program(program).is_some() {
        format!("\n{}", availability_summary())
    } else {
        String::new()
    };
    tracing::error!(program, "executable not found");
    BuilderError::CommandNotFound {
        program: program.to_owned(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use eebuild_common::error::ErrorKind;

    use super::*;

    #[test]
    fn captures_output_lines() {
        let output = run_command(&["echo", "hello world"], RunOptions::captured()).unwrap();
        assert!(output.success());
        assert_eq!(output.lines, vec!["hello world"]);
    }

    #[test]
    fn merges_stderr_into_output() {
        let output = run_command(
            &["sh", "-c", "echo out; echo err >&2"],
            RunOptions::captured(),
        )
        .unwrap();
        assert_eq!(output.lines, vec!["out", "err"]);
    }

    #[test]
    fn uncaptured_output_is_empty() {
        let output = run_command(&["echo", "quiet"], RunOptions::default()).unwrap();
        assert!(output.lines.is_empty());
    }

    #[test]
    fn nonzero_exit_fails_by_default() {
        let err = run_command(&["false"], RunOptions::captured()).unwrap_err();
        assert!(matches!(err, BuilderError::CommandFailed { code: 1, .. }));
        assert_eq!(err.kind(), ErrorKind::ExternalCommand);
    }

    #[test]
    fn nonzero_exit_is_returned_with_allow_error() {
        let output = run_command(
            &["sh", "-c", "exit 3"],
            RunOptions::default().allow_error(),
        )
        .unwrap();
        assert_eq!(output.code, 3);
        assert!(output.lines.is_empty());
    }

    #[test]
    fn missing_program_is_reported_without_runtime_hint() {
        let err = run_command(&["thisisnotacommand"], RunOptions::captured()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("You do not have thisisnotacommand installed"));
        assert!(!msg.contains("podman:"));
        assert_eq!(err.kind(), ErrorKind::ExternalCommand);
    }

    #[test]
    fn missing_container_runtime_lists_availability() {
        let err = run_command(
            &["/nonexistent/bin/docker", "history", "quay.io/foo/fooooo"],
            RunOptions::captured(),
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("You do not have /nonexistent/bin/docker installed"));
        assert!(msg.contains("podman: "));
        assert!(msg.contains("docker: "));
    }

    #[test]
    fn missing_program_fails_even_with_allow_error() {
        let err = run_command(
            &["thisisnotacommand"],
            RunOptions::default().allow_error(),
        )
        .unwrap_err();
        assert!(matches!(err, BuilderError::CommandNotFound { .. }));
    }

    #[test]
    fn empty_argv_is_a_configuration_error() {
        let argv: [&str; 0] = [];
        let err = run_command(&argv, RunOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
