//! Pure Rust collaborators
//!
//! Mirrors directories with `walkdir` instead of shelling out. Files are
//! copied when their size or modification time differs from the destination,
//! and destination entries missing from the source are removed.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use super::{CommandOutput, FileOps};

/// Built-in synchronizer and deleter
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeOps;

impl FileOps for NativeOps {
    fn synchronize(&self, source: &Path, destination: &Path) -> io::Result<CommandOutput> {
        let command = format!("mirror {} {}", source.display(), destination.display());
        tracing::debug!(%command, "running native synchronizer");
        Ok(finish(command, mirror(source, destination)))
    }

    fn delete_recursive(&self, path: &Path) -> io::Result<CommandOutput> {
        let command = format!("remove {}", path.display());
        tracing::debug!(%command, "running native deleter");
        Ok(finish(command, remove(path)))
    }
}

fn finish(command: String, result: io::Result<Vec<String>>) -> CommandOutput {
    match result {
        Ok(lines) => CommandOutput {
            command,
            status: 0,
            output: lines.join("\n"),
        },
        Err(e) => CommandOutput {
            command,
            status: 1,
            output: e.to_string(),
        },
    }
}

fn walk_error(e: walkdir::Error) -> io::Error {
    let message = e.to_string();
    e.into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message))
}

fn mirror(source: &Path, destination: &Path) -> io::Result<Vec<String>> {
    if !source.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", source.display()),
        ));
    }

    let mut lines = Vec::new();
    fs::create_dir_all(destination)?;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(walk_error)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = destination.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            if target.is_file() || target.is_symlink() {
                fs::remove_file(&target)?;
            }
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            if copy_symlink(entry.path(), &target)? {
                lines.push(format!("link {}", relative.display()));
            }
        } else if needs_copy(entry.path(), &target)? {
            clear(&target)?;
            fs::copy(entry.path(), &target)?;
            let modified = entry.metadata().map_err(walk_error)?.modified()?;
            set_modified(&target, modified);
            lines.push(format!("copy {}", relative.display()));
        }
    }

    for entry in WalkDir::new(destination).min_depth(1).contents_first(true) {
        let entry = entry.map_err(walk_error)?;
        let relative = entry
            .path()
            .strip_prefix(destination)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        if fs::symlink_metadata(source.join(relative)).is_err() {
            if entry.file_type().is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
            lines.push(format!("delete {}", relative.display()));
        }
    }

    Ok(lines)
}

fn needs_copy(source: &Path, target: &Path) -> io::Result<bool> {
    let Ok(existing) = fs::symlink_metadata(target) else {
        return Ok(true);
    };
    if !existing.is_file() {
        return Ok(true);
    }
    let original = fs::metadata(source)?;
    Ok(original.len() != existing.len() || original.modified()? != existing.modified()?)
}

/// Stamp a copy with the source's modification time
///
/// Read-only copies are stamped through a read handle, which unix permits for
/// the file's owner. If stamping fails the copy keeps its copy time and is
/// copied again on the next run.
fn set_modified(target: &Path, modified: std::time::SystemTime) {
    let stamped = fs::File::options()
        .write(true)
        .open(target)
        .or_else(|_| fs::File::open(target))
        .and_then(|file| file.set_modified(modified));
    if let Err(e) = stamped {
        tracing::debug!(path = %target.display(), error = %e, "could not set modification time");
    }
}

/// Remove whatever occupies `target`, if anything
fn clear(target: &Path) -> io::Result<()> {
    match fs::symlink_metadata(target) {
        Ok(existing) if existing.is_dir() => fs::remove_dir_all(target),
        Ok(_) => fs::remove_file(target),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn copy_symlink(source: &Path, target: &Path) -> io::Result<bool> {
    let link = fs::read_link(source)?;
    if fs::read_link(target).ok().as_ref() == Some(&link) {
        return Ok(false);
    }
    clear(target)?;
    std::os::unix::fs::symlink(link, target)?;
    Ok(true)
}

#[cfg(not(unix))]
fn copy_symlink(_source: &Path, _target: &Path) -> io::Result<bool> {
    // Symlinks are skipped where they cannot be recreated faithfully
    Ok(false)
}

fn remove(path: &Path) -> io::Result<Vec<String>> {
    match fs::symlink_metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Ok(vec![format!("{} does not exist", path.display())])
        }
        Err(e) => Err(e),
        Ok(meta) => {
            if meta.is_dir() {
                fs::remove_dir_all(path)?;
            } else {
                fs::remove_file(path)?;
            }
            Ok(vec![format!("removed {}", path.display())])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_mirror_copies_tree() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        write(&src.join("a.txt"), "alpha");
        write(&src.join("deep/nested/b.txt"), "beta");
        write(&src.join(".hidden"), "dot");

        let result = NativeOps.synchronize(&src, &dst).unwrap();
        assert!(result.success(), "{}", result.output);

        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "alpha");
        assert_eq!(fs::read_to_string(dst.join("deep/nested/b.txt")).unwrap(), "beta");
        assert_eq!(fs::read_to_string(dst.join(".hidden")).unwrap(), "dot");
    }

    #[test]
    fn test_mirror_deletes_extra_entries() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        write(&src.join("keep.txt"), "keep");
        write(&dst.join("stale.txt"), "stale");
        write(&dst.join("old/dir/file.txt"), "old");

        let result = NativeOps.synchronize(&src, &dst).unwrap();
        assert!(result.success(), "{}", result.output);

        assert!(dst.join("keep.txt").exists());
        assert!(!dst.join("stale.txt").exists());
        assert!(!dst.join("old").exists());
        assert!(result.output.contains("delete stale.txt"));
    }

    #[test]
    fn test_mirror_skips_unchanged_files() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        write(&src.join("a.txt"), "alpha");

        NativeOps.synchronize(&src, &dst).unwrap();
        let second = NativeOps.synchronize(&src, &dst).unwrap();

        assert!(second.success());
        assert!(!second.output.contains("copy a.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_mirror_skips_unchanged_read_only_files() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        write(&src.join("locked.txt"), "locked");
        fs::set_permissions(src.join("locked.txt"), fs::Permissions::from_mode(0o444)).unwrap();

        let first = NativeOps.synchronize(&src, &dst).unwrap();
        assert!(first.output.contains("copy locked.txt"));

        let source_time = fs::metadata(src.join("locked.txt")).unwrap().modified().unwrap();
        let copy_time = fs::metadata(dst.join("locked.txt")).unwrap().modified().unwrap();
        assert_eq!(source_time, copy_time);

        let second = NativeOps.synchronize(&src, &dst).unwrap();
        assert!(second.success(), "{}", second.output);
        assert!(!second.output.contains("copy locked.txt"));
    }

    #[test]
    fn test_mirror_updates_changed_files() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        write(&src.join("a.txt"), "alpha");
        NativeOps.synchronize(&src, &dst).unwrap();

        write(&src.join("a.txt"), "alpha, revised");
        NativeOps.synchronize(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "alpha, revised");
    }

    #[test]
    fn test_mirror_missing_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = NativeOps
            .synchronize(&temp_dir.path().join("missing"), &temp_dir.path().join("dst"))
            .unwrap();
        assert!(!result.success());
    }

    #[test]
    fn test_remove_tree_and_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("2024-03-03");
        write(&target.join("etc/app/conf"), "x");

        assert!(NativeOps.delete_recursive(&target).unwrap().success());
        assert!(!target.exists());

        let again = NativeOps.delete_recursive(&target).unwrap();
        assert!(again.success());
        assert!(again.output.contains("does not exist"));
    }
}
