//! `nodefn lockfile` command implementation.

use super::output::{fail, print_json, SCHEMA_VERSION};
use miette::Result;
use nodefn_core::lockfile::{find_lock_file, LockFileError};
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize)]
struct LockFileOutput {
    ok: bool,
    schema_version: u32,
    lock_file: String,
    package_manager: &'static str,
    project_root: String,
    install_command: &'static str,
}

/// Locate (or validate) the dependency lock file.
pub fn run(cwd: &Path, path: Option<&Path>, json: bool) -> Result<()> {
    let lock = match find_lock_file(path, cwd) {
        Ok(lock) => lock,
        Err(e) => {
            let validation = !matches!(e, LockFileError::Io { .. });
            fail(e.code(), &e.to_string(), validation, json)
        }
    };

    info!(
        lock_file = %lock.path.display(),
        package_manager = lock.package_manager.as_str(),
        "lock file found"
    );

    if json {
        print_json(&LockFileOutput {
            ok: true,
            schema_version: SCHEMA_VERSION,
            lock_file: lock.path.to_string_lossy().into_owned(),
            package_manager: lock.package_manager.as_str(),
            project_root: lock.dir().to_string_lossy().into_owned(),
            install_command: lock.package_manager.install_command(),
        })
    } else {
        println!("Lock file:       {}", lock.path.display());
        println!("Package manager: {}", lock.package_manager.as_str());
        println!("Project root:    {}", lock.dir().display());
        Ok(())
    }
}
