//! # eebuild-fs
//!
//! Filesystem synchronization used while assembling a build context.
//!
//! Handles:
//! - **Copy**: [`copy_file`] and [`copy_directory`] only touch the
//!   destination when content, modification time, or symlink target differ.
//! - **Write**: [`write_file`] replaces a text file only when the rendered
//!   lines differ from what is already on disk.
//!
//! Symlinks are never dereferenced: a symlink source always produces a
//! symlink destination, even when its target does not exist.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod copy;
pub mod write;

pub use copy::{copy_directory, copy_file};
pub use write::{remove_file, write_file};
