//! Bundling capability.
//!
//! Function planning hands its validated inputs to a [`Bundler`]. The crate
//! ships only [`FingerprintBundler`], a dry run that hashes the inputs so a
//! plan can tell when its code would change. Real bundlers live outside.

use crate::lockfile::PackageManager;
use crate::runtime::Runtime;
use nodefn_util::hash::Fingerprint;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Inputs for bundling one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    pub entry: PathBuf,
    pub project_root: PathBuf,
    pub lock_file: PathBuf,
    pub package_manager: PackageManager,
    pub runtime: Runtime,
}

/// What a bundler produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleOutput {
    pub asset_hash: String,
    /// Directory holding the bundled code, if anything was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_path: Option<PathBuf>,
}

#[derive(Error, Debug)]
#[error("bundling {entry} failed: {message}")]
pub struct BundleError {
    pub entry: PathBuf,
    pub message: String,
}

impl BundleError {
    #[must_use]
    pub fn new(entry: &Path, message: impl Into<String>) -> Self {
        Self {
            entry: entry.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Turns a validated entry into deployable code.
pub trait Bundler {
    /// Bundle the function described by `request`.
    ///
    /// # Errors
    /// Returns an error if the code cannot be produced.
    fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, BundleError>;
}

/// Dry-run bundler: fingerprints entry, lock file and runtime without
/// producing any code.
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintBundler;

impl Bundler for FingerprintBundler {
    fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, BundleError> {
        let mut fp = Fingerprint::new();
        fp.add_str(request.runtime.name())
            .add_str(request.package_manager.as_str());

        for path in [&request.entry, &request.lock_file] {
            fp.add_file(path)
                .map_err(|e| BundleError::new(&request.entry, format!("{}: {e}", path.display())))?;
        }

        Ok(BundleOutput {
            asset_hash: fp.finish(),
            asset_path: None,
        })
    }
}
