//! # eebuild-runtime
//!
//! Boundary to the programs eebuild shells out to.
//!
//! - **Command**: [`run_command`] runs an argv, streams its merged output to
//!   the log, and turns missing executables and failed exits into
//!   [`eebuild_common::error::BuilderError`] values.
//! - **Detect**: [`ContainerRuntime`] reports which container engines are
//!   available on `PATH`.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod command;
pub mod detect;

pub use command::{CommandOutput, RunOptions, run_command};
pub use detect::{ContainerRuntime, availability_summary};
