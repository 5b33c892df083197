//! Change-aware copying of files, symlinks, and directory trees.
//!
//! Entry kinds are read with `symlink_metadata`, so a symlink is always
//! handled as a link and never as the file it points to.

use std::fs::{self, File, FileTimes, Metadata};
use std::io::{self, BufRead, BufReader};
use std::os::unix::fs::symlink;
use std::path::Path;

use eebuild_common::error::{BuilderError, Result};
use walkdir::WalkDir;

/// Brings `destination` in line with `source`, returning whether anything changed.
///
/// | source  | destination                        | action                    |
/// |---------|------------------------------------|---------------------------|
/// | symlink | missing                            | create symlink            |
/// | symlink | symlink with the same target       | nothing                   |
/// | symlink | other symlink or regular file      | replace with symlink      |
/// | regular | missing or symlink                 | copy content and metadata |
/// | regular | regular, same content and mtime    | nothing                   |
/// | regular | regular, content or mtime differs  | copy content and metadata |
///
/// `ignore_mtime` drops the modification time from the comparison only;
/// an actual copy always carries the source's access and modification time
/// and permission bits. The destination's parent directory must exist.
///
/// # Errors
///
/// Returns [`BuilderError::DirectoryConflict`] if either path is a directory,
/// and [`BuilderError::Io`] if the source entry does not exist or any
/// filesystem operation fails.
pub fn copy_file(source: &Path, destination: &Path, ignore_mtime: bool) -> Result<bool> {
    let source_meta = fs::symlink_metadata(source).map_err(|e| BuilderError::io(source, e))?;
    if source_meta.is_dir() {
        return Err(BuilderError::DirectoryConflict {
            role: "source",
            path: source.to_path_buf(),
        });
    }

    let destination_meta = existing_metadata(destination)?;
    if destination_meta.as_ref().is_some_and(Metadata::is_dir) {
        return Err(BuilderError::DirectoryConflict {
            role: "destination",
            path: destination.to_path_buf(),
        });
    }

    if source_meta.file_type().is_symlink() {
        sync_symlink(source, destination, destination_meta.as_ref())
    } else {
        sync_regular(
            source,
            &source_meta,
            destination,
            destination_meta.as_ref(),
            ignore_mtime,
        )
    }
}

/// Mirrors the tree under `source` into `destination` with [`copy_file`].
///
/// Destination directories are created as needed. Symlinks inside the tree,
/// including links to directories, are reproduced as links. Files that exist
/// only in the destination are left alone. Returns whether any directory was
/// created or any file changed.
///
/// # Errors
///
/// Returns [`BuilderError::NotADirectory`] if `source` is not a directory,
/// or the first error raised while walking or copying.
pub fn copy_directory(source: &Path, destination: &Path) -> Result<bool> {
    if !source.is_dir() {
        return Err(BuilderError::NotADirectory {
            path: source.to_path_buf(),
        });
    }
    tracing::debug!(
        source = %source.display(),
        destination = %destination.display(),
        "mirroring directory"
    );

    let mut changed = false;
    for entry in WalkDir::new(source).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            BuilderError::io(path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| BuilderError::Config {
                message: format!(
                    "{} is outside of {}",
                    entry.path().display(),
                    source.display()
                ),
            })?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            if !target.is_dir() {
                fs::create_dir_all(&target).map_err(|e| BuilderError::io(&target, e))?;
                changed = true;
            }
        } else {
            changed |= copy_file(entry.path(), &target, false)?;
        }
    }
    Ok(changed)
}

/// Returns the metadata of `path` without following links, or `None` if absent.
fn existing_metadata(path: &Path) -> Result<Option<Metadata>> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BuilderError::io(path, e)),
    }
}

fn sync_symlink(source: &Path, destination: &Path, existing: Option<&Metadata>) -> Result<bool> {
    let target = fs::read_link(source).map_err(|e| BuilderError::io(source, e))?;

    if let Some(meta) = existing {
        if meta.file_type().is_symlink() {
            let current = fs::read_link(destination).map_err(|e| BuilderError::io(destination, e))?;
            if current == target {
                tracing::trace!(path = %destination.display(), "symlink already up to date");
                return Ok(false);
            }
        }
        fs::remove_file(destination).map_err(|e| BuilderError::io(destination, e))?;
    }

    symlink(&target, destination).map_err(|e| BuilderError::io(destination, e))?;
    tracing::debug!(
        path = %destination.display(),
        target = %target.display(),
        "created symlink"
    );
    Ok(true)
}

fn sync_regular(
    source: &Path,
    source_meta: &Metadata,
    destination: &Path,
    existing: Option<&Metadata>,
    ignore_mtime: bool,
) -> Result<bool> {
    match existing {
        Some(meta) if meta.file_type().is_symlink() => {
            fs::remove_file(destination).map_err(|e| BuilderError::io(destination, e))?;
        }
        Some(meta) => {
            let times_match = ignore_mtime || same_mtime(source_meta, meta);
            if times_match
                && source_meta.len() == meta.len()
                && same_content(source, destination)?
            {
                tracing::trace!(path = %destination.display(), "file already up to date");
                return Ok(false);
            }
        }
        None => {}
    }

    copy_with_metadata(source, source_meta, destination)?;
    tracing::debug!(
        source = %source.display(),
        destination = %destination.display(),
        "copied file"
    );
    Ok(true)
}

fn same_mtime(left: &Metadata, right: &Metadata) -> bool {
    left.modified().ok() == right.modified().ok()
}

/// Compares two files byte for byte without loading either fully.
fn same_content(left: &Path, right: &Path) -> Result<bool> {
    let open = |path: &Path| {
        File::open(path)
            .map(BufReader::new)
            .map_err(|e| BuilderError::io(path, e))
    };
    let mut left_reader = open(left)?;
    let mut right_reader = open(right)?;

    loop {
        let left_buf = left_reader.fill_buf().map_err(|e| BuilderError::io(left, e))?;
        let right_buf = right_reader.fill_buf().map_err(|e| BuilderError::io(right, e))?;
        if left_buf.is_empty() || right_buf.is_empty() {
            return Ok(left_buf.is_empty() && right_buf.is_empty());
        }
        let n = left_buf.len().min(right_buf.len());
        if left_buf[..n] != right_buf[..n] {
            return Ok(false);
        }
        left_reader.consume(n);
        right_reader.consume(n);
    }
}

fn copy_with_metadata(source: &Path, source_meta: &Metadata, destination: &Path) -> Result<()> {
    // fs::copy carries the permission bits over.
    let _ = fs::copy(source, destination).map_err(|e| BuilderError::io(destination, e))?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = source_meta.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = source_meta.modified() {
        times = times.set_modified(modified);
    }
    File::open(destination)
        .and_then(|file| file.set_times(times))
        .map_err(|e| BuilderError::io(destination, e))
}
