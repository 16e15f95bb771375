#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::return_self_not_must_use)]

//! Core of nodefn: resolves a Node.js function's handler entry, its lock
//! file and runtime settings, and plans it for deployment.

pub mod bundler;
pub mod config;
pub mod entry;
pub mod environment;
pub mod error;
pub mod function;
pub mod lockfile;
pub mod manifest;
pub mod runtime;
pub mod version;
pub mod vpc;

pub use bundler::{BundleError, BundleOutput, BundleRequest, Bundler, FingerprintBundler};
pub use config::Config;
pub use entry::{resolve_entry, EntryError, EntryExtension, ResolutionRequest, ResolvedEntry};
pub use error::Error;
pub use function::{FunctionBuilder, FunctionError, FunctionPlan, FunctionProps};
pub use lockfile::{find_lock_file, LockFile, LockFileError, PackageManager};
pub use manifest::{load_manifest, LoadedManifest, Manifest};
pub use runtime::Runtime;
pub use version::VERSION;
