use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Fold `.` and `..` components without touching the filesystem.
///
/// Symlinks are left alone, so a symlinked file keeps its own path.
/// A `..` at the root stays at the root.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Join `path` onto `base` unless it is already absolute, then normalize.
#[must_use]
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&base.join(path))
    }
}

/// Check whether `path` is a regular file, following symlinks.
///
/// Returns `Ok(false)` when nothing is there (or it is not a file), and
/// an error for anything other than "not found".
///
/// # Errors
/// Returns the underlying I/O error when the path cannot be stat'ed for a
/// reason other than absence (e.g. permission denied).
pub fn is_regular_file(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Walk up from `start` and return the nearest directory containing at least
/// one of `names` as a regular file, along with every match found in that
/// directory (in `names` order).
///
/// # Errors
/// Returns the first I/O error other than "not found" hit while checking candidates.
pub fn find_up(start: &Path, names: &[&str]) -> io::Result<Option<(PathBuf, Vec<PathBuf>)>> {
    let mut current = start.to_path_buf();

    loop {
        let mut found = Vec::new();
        for name in names {
            let candidate = current.join(name);
            if is_regular_file(&candidate)? {
                found.push(candidate);
            }
        }

        if !found.is_empty() {
            return Ok(Some((current, found)));
        }

        if !current.pop() {
            return Ok(None);
        }
    }
}
