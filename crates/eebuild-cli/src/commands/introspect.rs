//! `eebuild introspect`: consolidate collection requirements.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use eebuild_common::config::IntrospectConfig;
use eebuild_common::constants::DEFAULT_COLLECTIONS_PATH;
use eebuild_introspect::{IntrospectReport, collect_requirements, write_outputs};

use crate::output;

/// Arguments for the `introspect` command.
#[derive(Args, Debug)]
pub struct IntrospectArgs {
    /// Collections directory, or a directory containing `ansible_collections`.
    #[arg(default_value = DEFAULT_COLLECTIONS_PATH)]
    pub folder: PathBuf,

    /// Write the consolidated system requirements to this file.
    #[arg(long, value_name = "FILE")]
    pub write_bindep: Option<PathBuf>,

    /// Write the consolidated Python requirements to this file.
    #[arg(long, value_name = "FILE")]
    pub write_pip: Option<PathBuf>,

    /// Additional Python requirements attributed to the user.
    #[arg(long, value_name = "FILE")]
    pub user_pip: Option<PathBuf>,

    /// Additional system requirements attributed to the user.
    #[arg(long, value_name = "FILE")]
    pub user_bindep: Option<PathBuf>,

    /// Python package names to leave out, one per line.
    #[arg(long, value_name = "FILE")]
    pub exclude_pip_reqs: Option<PathBuf>,

    /// System package names to leave out, one per line.
    #[arg(long, value_name = "FILE")]
    pub exclude_bindep_reqs: Option<PathBuf>,

    /// Collections (`namespace.name`) whose requirements are left out.
    #[arg(long, value_name = "FILE")]
    pub exclude_collection_reqs: Option<PathBuf>,
}

impl From<IntrospectArgs> for IntrospectConfig {
    fn from(args: IntrospectArgs) -> Self {
        Self {
            collections_path: args.folder,
            user_python: args.user_pip,
            user_system: args.user_bindep,
            exclude_python: args.exclude_pip_reqs,
            exclude_system: args.exclude_bindep_reqs,
            exclude_collections: args.exclude_collection_reqs,
            write_python: args.write_pip,
            write_system: args.write_bindep,
        }
    }
}

/// Executes the `introspect` command.
///
/// # Errors
///
/// Returns an error if an input file is missing, the collections path is
/// not a directory, or an output file cannot be written.
#[allow(clippy::print_stdout)]
pub fn execute(args: IntrospectArgs) -> anyhow::Result<()> {
    let config = IntrospectConfig::from(args);
    tracing::info!(path = %config.collections_path.display(), "introspecting collections");

    let requirements = collect_requirements(&config)?;
    let report = IntrospectReport::from_requirements(&requirements)
        .to_yaml()
        .context("failed to render dependency report")?;
    println!("{}", output::report_header(&config.collections_path));
    print!("{report}");

    let changed = write_outputs(&config, &requirements)?;
    tracing::info!(changed, "introspection complete");
    Ok(())
}
