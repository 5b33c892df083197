//! # eebuild-introspect
//!
//! Collects the Python and system requirements declared by installed
//! collections and consolidates them into provenance-annotated files.
//!
//! Handles:
//! - **Collection**: discovery of `namespace/name` trees and their
//!   execution environment metadata.
//! - **Requirement**: pip and bindep line parsing and name normalization.
//! - **Exclusion**: package-name and collection-id filters.
//! - **Aggregate**: merging, filtering, deduplication, rendering, and
//!   write-if-changed output.
//! - **Report**: YAML summary of what was found.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod aggregate;
pub mod collection;
pub mod exclusion;
pub mod report;
pub mod requirement;

pub use aggregate::{Aggregator, Requirements, collect_requirements, render, write_outputs};
pub use collection::{Collection, discover};
pub use exclusion::Exclusions;
pub use report::IntrospectReport;
pub use requirement::{LineError, Requirement};
