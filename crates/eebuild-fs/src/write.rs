//! Write-if-changed for generated text files.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use eebuild_common::error::{BuilderError, Result};

/// Writes `lines` joined by `\n` to `path` unless the file already holds exactly that text.
///
/// Pass an empty trailing line to end the file with a newline. The parent
/// directory is created when missing. If `path` is a symlink the file it
/// points to is rewritten and the link is kept. An existing file keeps its
/// permission bits. Returns `true` if the file was written.
///
/// # Errors
///
/// Returns [`BuilderError::Io`] if the existing file cannot be read or the
/// new content cannot be written.
pub fn write_file<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<bool> {
    let text = lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");

    match fs::read(path) {
        Ok(existing) if existing == text.as_bytes() => {
            tracing::debug!(path = %path.display(), "file is already up-to-date");
            return Ok(false);
        }
        Ok(_) => {
            tracing::warn!(path = %path.display(), "file had modifications and will be rewritten");
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(BuilderError::io(path, e)),
    }

    let target = resolve_target(path)?;
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BuilderError::io(parent, e))?;
    }
    write_atomic(&target, text.as_bytes())?;
    tracing::info!(path = %path.display(), "wrote file");
    Ok(true)
}

/// Removes the file at `path` if there is one. Returns whether it existed.
///
/// # Errors
///
/// Returns [`BuilderError::Io`] if the file exists but cannot be removed.
pub fn remove_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "removed file");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BuilderError::io(path, e)),
    }
}

const MAX_SYMLINK_HOPS: usize = 40;

/// Follows `path` through any symlinks to the file that should be replaced.
fn resolve_target(path: &Path) -> Result<PathBuf> {
    let mut target = path.to_path_buf();
    for _ in 0..MAX_SYMLINK_HOPS {
        match fs::symlink_metadata(&target) {
            Ok(meta) if meta.file_type().is_symlink() => {
                let link = fs::read_link(&target).map_err(|e| BuilderError::io(&target, e))?;
                target = match target.parent() {
                    Some(parent) => parent.join(link),
                    None => link,
                };
            }
            Ok(_) => return Ok(target),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(target),
            Err(e) => return Err(BuilderError::io(&target, e)),
        }
    }
    Err(BuilderError::Config {
        message: format!("too many levels of symbolic links at {}", path.display()),
    })
}

/// Writes to a sibling temp file and renames it over `path`.
///
/// The temp file takes over the permission bits of the file it replaces.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let file_name = path.file_name().ok_or_else(|| BuilderError::Config {
        message: format!("{} does not name a file", path.display()),
    })?;
    let temp_path = path.with_file_name(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let existing_permissions = fs::metadata(path).ok().map(|meta| meta.permissions());
    let written = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .and_then(|mut file| {
            file.write_all(content)?;
            if let Some(permissions) = existing_permissions {
                file.set_permissions(permissions)?;
            }
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp_path, path));

    written.map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        BuilderError::io(path, e)
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn write_file_creates_then_skips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bar").join("foo.txt");
        let text = [
            "foo  # from some collection",
            "bar",
            "# a comment",
            "",
            "zoo",
            "",
        ];

        assert!(write_file(&path, &text).expect("first write"));
        assert!(!write_file(&path, &text).expect("second write"));
        assert_eq!(
            fs::read_to_string(&path).expect("read"),
            "foo  # from some collection\nbar\n# a comment\n\nzoo\n"
        );
    }

    #[test]
    fn write_file_rewrites_changed_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        fs::write(&path, "old\n").expect("seed");

        assert!(write_file(&path, &["new", ""]).expect("write"));
        assert_eq!(fs::read_to_string(&path).expect("read"), "new\n");
    }

    #[test]
    fn trailing_newline_is_significant() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        fs::write(&path, "line").expect("seed");

        assert!(write_file(&path, &["line", ""]).expect("write"));
        assert!(!write_file(&path, &["line", ""]).expect("write again"));
    }

    #[test]
    fn write_file_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        assert!(write_file(&path, &["a"]).expect("write"));

        let names: Vec<_> = fs::read_dir(dir.path())
            .expect("read_dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.txt")]);
    }

    #[test]
    fn symlinked_output_stays_a_link() {
        let dir = tempfile::tempdir().expect("tempdir");
        let real = dir.path().join("real.txt");
        let link = dir.path().join("out.txt");
        fs::write(&real, "old\n").expect("seed");
        std::os::unix::fs::symlink("real.txt", &link).expect("symlink");

        assert!(write_file(&link, &["new", ""]).expect("write"));
        assert!(fs::symlink_metadata(&link).expect("lstat").file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).expect("read"), "new\n");
    }

    #[test]
    fn rewrite_keeps_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        fs::write(&path, "old\n").expect("seed");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).expect("chmod");

        assert!(write_file(&path, &["new", ""]).expect("write"));
        let mode = fs::metadata(&path).expect("stat").permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn remove_file_reports_whether_it_removed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stale.txt");
        fs::write(&path, "x").expect("seed");

        assert!(remove_file(&path).expect("remove"));
        assert!(!path.exists());
        assert!(!remove_file(&path).expect("remove again"));
    }
}
