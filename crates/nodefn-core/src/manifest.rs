//! Project manifest (`nodefn.json`) discovery and parsing.
//!
//! ```json
//! {
//!   "caller": "lib/app-stack.ts",
//!   "functions": {
//!     "Api": { "runtime": "nodejs20.x" },
//!     "Worker": { "entry": "../src/worker.ts", "memorySize": 512 }
//!   }
//! }
//! ```
//!
//! `caller` is relative to the manifest's directory. Function ids are kept
//! in sorted order so plans come out deterministically.

use crate::error::Error;
use crate::function::FunctionProps;
use nodefn_util::fs::{absolutize, find_up};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "nodefn.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Manifest {
    /// File the functions are defined in.
    pub caller: PathBuf,
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionProps>,
}

/// A manifest together with where it was read from.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub path: PathBuf,
    pub manifest: Manifest,
}

impl LoadedManifest {
    /// Directory holding the manifest.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }

    /// Absolute path of the caller file.
    #[must_use]
    pub fn caller_file(&self) -> PathBuf {
        absolutize(self.dir(), &self.manifest.caller)
    }
}

/// Find `nodefn.json` by walking up from `start`.
///
/// # Errors
/// Returns an error if a candidate cannot be checked for a reason other than absence.
pub fn find_manifest(start: &Path) -> Result<Option<PathBuf>, Error> {
    Ok(find_up(start, &[MANIFEST_FILE])?.and_then(|(_, mut found)| found.pop()))
}

/// Load the manifest at `explicit` (relative to `cwd`), or the nearest one above `cwd`.
///
/// # Errors
/// Returns an error if no manifest is found, or it cannot be read or parsed.
pub fn load_manifest(cwd: &Path, explicit: Option<&Path>) -> Result<LoadedManifest, Error> {
    let path = match explicit {
        Some(p) => absolutize(cwd, p),
        None => find_manifest(cwd)?.ok_or_else(|| Error::ManifestNotFound {
            start: cwd.to_path_buf(),
        })?,
    };

    let source = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
        path: path.clone(),
        source,
    })?;
    let manifest: Manifest =
        serde_json::from_str(&source).map_err(|source| Error::ConfigParse {
            path: path.clone(),
            source,
        })?;

    Ok(LoadedManifest { path, manifest })
}
