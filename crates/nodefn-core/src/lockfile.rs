//! Dependency lock file discovery and package manager detection.

use nodefn_util::fs::{absolutize, find_up};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stable error codes for lock file lookup.
pub mod codes {
    pub const LOCKFILE_NOT_FOUND: &str = "LOCKFILE_NOT_FOUND";
    pub const LOCKFILE_NOT_A_FILE: &str = "LOCKFILE_NOT_A_FILE";
    pub const LOCKFILE_MULTIPLE: &str = "LOCKFILE_MULTIPLE";
    pub const LOCKFILE_MISSING: &str = "LOCKFILE_MISSING";
    pub const LOCKFILE_IO: &str = "LOCKFILE_IO";
}

pub const PNPM_LOCK: &str = "pnpm-lock.yaml";
pub const YARN_LOCK: &str = "yarn.lock";
pub const BUN_LOCK: &str = "bun.lockb";
pub const NPM_LOCK: &str = "package-lock.json";

/// Lock file names checked in each directory, in this order.
pub const LOCK_FILE_NAMES: &[&str] = &[PNPM_LOCK, YARN_LOCK, BUN_LOCK, NPM_LOCK];

/// Package manager owning a lock file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    /// Detect from a lock file's name. Unknown names are treated as npm.
    #[must_use]
    pub fn from_lock_file(path: &Path) -> Self {
        match path.file_name().and_then(|n| n.to_str()) {
            Some(YARN_LOCK) => Self::Yarn,
            Some(PNPM_LOCK) => Self::Pnpm,
            Some(BUN_LOCK) => Self::Bun,
            _ => Self::Npm,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
        }
    }

    #[must_use]
    pub fn lock_file_name(&self) -> &'static str {
        match self {
            Self::Npm => NPM_LOCK,
            Self::Yarn => YARN_LOCK,
            Self::Pnpm => PNPM_LOCK,
            Self::Bun => BUN_LOCK,
        }
    }

    /// Command that installs exactly what the lock file pins.
    #[must_use]
    pub fn install_command(&self) -> &'static str {
        match self {
            Self::Npm => "npm ci",
            Self::Yarn => "yarn install --frozen-lockfile",
            Self::Pnpm => "pnpm install --frozen-lockfile",
            Self::Bun => "bun install --frozen-lockfile",
        }
    }
}

/// A located lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFile {
    pub path: PathBuf,
    pub package_manager: PackageManager,
}

impl LockFile {
    fn new(path: PathBuf) -> Self {
        let package_manager = PackageManager::from_lock_file(&path);
        Self {
            path,
            package_manager,
        }
    }

    /// Directory holding the lock file; the default project root.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }
}

/// Lock file lookup error.
#[derive(Error, Debug)]
pub enum LockFileError {
    #[error("Lock file at {path} doesn't exist")]
    NotFound { path: PathBuf },

    #[error("`depsLockFilePath` should point to a file: {path}")]
    NotAFile { path: PathBuf },

    #[error(
        "Multiple package lock files found: {}. Please specify the desired one with `depsLockFilePath`.",
        join_paths(.paths)
    )]
    Multiple { paths: Vec<PathBuf> },

    #[error(
        "Cannot find a package lock file (`pnpm-lock.yaml`, `yarn.lock`, `bun.lockb` or `package-lock.json`) from {start}. Please specify it with `depsLockFilePath`."
    )]
    Missing { start: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl LockFileError {
    /// Get the stable error code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => codes::LOCKFILE_NOT_FOUND,
            Self::NotAFile { .. } => codes::LOCKFILE_NOT_A_FILE,
            Self::Multiple { .. } => codes::LOCKFILE_MULTIPLE,
            Self::Missing { .. } => codes::LOCKFILE_MISSING,
            Self::Io { .. } => codes::LOCKFILE_IO,
        }
    }
}

/// Locate the dependency lock file.
///
/// An explicit path is validated as-is (resolved against `start_dir` when
/// relative). Otherwise the nearest directory above `start_dir` holding a
/// known lock file wins.
///
/// # Errors
/// Returns an error if:
/// - An explicit path does not exist or is not a file
/// - The nearest directory holds more than one lock file
/// - No lock file exists up to the filesystem root
/// - Checking a candidate fails for a reason other than absence
pub fn find_lock_file(explicit: Option<&Path>, start_dir: &Path) -> Result<LockFile, LockFileError> {
    if let Some(explicit) = explicit {
        let path = absolutize(start_dir, explicit);
        return match path.metadata() {
            Ok(meta) if meta.is_file() => Ok(LockFile::new(path)),
            Ok(_) => Err(LockFileError::NotAFile { path }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LockFileError::NotFound { path }),
            Err(source) => Err(LockFileError::Io { path, source }),
        };
    }

    let discovered = find_up(start_dir, LOCK_FILE_NAMES).map_err(|source| LockFileError::Io {
        path: start_dir.to_path_buf(),
        source,
    })?;
    let Some((_, mut found)) = discovered else {
        return Err(LockFileError::Missing {
            start: start_dir.to_path_buf(),
        });
    };

    if found.len() > 1 {
        return Err(LockFileError::Multiple { paths: found });
    }

    Ok(LockFile::new(found.remove(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_detects_package_manager() {
        assert_eq!(
            PackageManager::from_lock_file(Path::new("/p/yarn.lock")),
            PackageManager::Yarn
        );
        assert_eq!(
            PackageManager::from_lock_file(Path::new("/p/pnpm-lock.yaml")),
            PackageManager::Pnpm
        );
        assert_eq!(
            PackageManager::from_lock_file(Path::new("/p/bun.lockb")),
            PackageManager::Bun
        );
        assert_eq!(
            PackageManager::from_lock_file(Path::new("/p/package-lock.json")),
            PackageManager::Npm
        );
        assert_eq!(
            PackageManager::from_lock_file(Path::new("/p/custom.lock")),
            PackageManager::Npm
        );
    }

    #[test]
    fn test_lock_file_names_round_trip() {
        for pm in [
            PackageManager::Npm,
            PackageManager::Yarn,
            PackageManager::Pnpm,
            PackageManager::Bun,
        ] {
            assert_eq!(PackageManager::from_lock_file(Path::new(pm.lock_file_name())), pm);
        }
    }

    #[test]
    fn test_explicit_lock_file() {
        let dir = tempdir().unwrap();
        let lock = dir.path().join("yarn.lock");
        fs::write(&lock, "").unwrap();

        let found = find_lock_file(Some(Path::new("yarn.lock")), dir.path()).unwrap();
        assert_eq!(found.path, lock);
        assert_eq!(found.package_manager, PackageManager::Yarn);
        assert_eq!(found.dir(), dir.path());
    }

    #[test]
    fn test_explicit_lock_file_missing() {
        let dir = tempdir().unwrap();

        let err = find_lock_file(Some(Path::new("does/not/exist.lock")), dir.path()).unwrap_err();
        assert_eq!(err.code(), codes::LOCKFILE_NOT_FOUND);
        assert!(err.to_string().contains("doesn't exist"));
        assert!(err
            .to_string()
            .contains(&dir.path().join("does/not/exist.lock").display().to_string()));
    }

    #[test]
    fn test_explicit_lock_file_is_directory() {
        let dir = tempdir().unwrap();

        let err = find_lock_file(Some(dir.path()), dir.path()).unwrap_err();
        assert_eq!(err.code(), codes::LOCKFILE_NOT_A_FILE);
        assert!(err.to_string().contains("should point to a file"));
    }

    #[test]
    fn test_explicit_lock_file_skips_discovery() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("yarn.lock"), "").unwrap();
        fs::write(dir.path().join("package-lock.json"), "{}").unwrap();

        let found =
            find_lock_file(Some(&dir.path().join("package-lock.json")), dir.path()).unwrap();
        assert_eq!(found.package_manager, PackageManager::Npm);
    }

    #[test]
    fn test_discovers_nearest_lock_file() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("packages").join("api");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(dir.path().join("yarn.lock"), "").unwrap();
        fs::write(dir.path().join("packages").join("pnpm-lock.yaml"), "").unwrap();

        let found = find_lock_file(None, &pkg).unwrap();
        assert_eq!(found.path, dir.path().join("packages").join("pnpm-lock.yaml"));
        assert_eq!(found.package_manager, PackageManager::Pnpm);
    }

    #[test]
    fn test_directory_named_like_lock_file_is_skipped() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("pkg");
        fs::create_dir_all(pkg.join(NPM_LOCK)).unwrap();
        fs::write(dir.path().join(YARN_LOCK), "").unwrap();

        let found = find_lock_file(None, &pkg).unwrap();
        assert_eq!(found.path, dir.path().join(YARN_LOCK));
        assert_eq!(found.package_manager, PackageManager::Yarn);
    }

    #[test]
    fn test_multiple_lock_files_in_one_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("yarn.lock"), "").unwrap();
        fs::write(dir.path().join("package-lock.json"), "{}").unwrap();

        let err = find_lock_file(None, dir.path()).unwrap_err();
        assert_eq!(err.code(), codes::LOCKFILE_MULTIPLE);
        let message = err.to_string();
        assert!(message.contains("yarn.lock"));
        assert!(message.contains("package-lock.json"));
    }

    #[test]
    fn test_missing_error_names_all_lock_files() {
        let err = LockFileError::Missing {
            start: PathBuf::from("/work"),
        };
        assert_eq!(err.code(), codes::LOCKFILE_MISSING);
        let message = err.to_string();
        for name in LOCK_FILE_NAMES {
            assert!(message.contains(name), "{message} should name {name}");
        }
        assert!(message.contains("depsLockFilePath"));
    }
}
