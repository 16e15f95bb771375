//! Function planning.
//!
//! Turns a construct id plus optional properties into a validated
//! [`FunctionPlan`]: entry, lock file, runtime, environment, VPC placement,
//! and the code produced by an injected [`Bundler`].

use crate::bundler::{BundleError, BundleOutput, BundleRequest, Bundler};
use crate::entry::{resolve_entry, EntryError, ResolutionRequest, ResolvedEntry};
use crate::environment::{build_environment, EnvironmentError};
use crate::lockfile::{find_lock_file, LockFile, LockFileError};
use crate::runtime::{Runtime, RuntimeFamily};
use crate::vpc::{attach, VpcAttachment, VpcConfig, VpcError};
use nodefn_util::fs::absolutize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Schema version for `FunctionPlan`. Bump when changing the format.
pub const FUNCTION_PLAN_SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_HANDLER: &str = "handler";
pub const DEFAULT_MEMORY_SIZE_MB: u32 = 128;
pub const DEFAULT_TIMEOUT_SECONDS: u32 = 3;

const MEMORY_SIZE_RANGE_MB: std::ops::RangeInclusive<u32> = 128..=10_240;
const TIMEOUT_RANGE_SECONDS: std::ops::RangeInclusive<u32> = 1..=900;

/// Stable error codes owned by the builder itself.
pub mod codes {
    pub const RUNTIME_NOT_NODEJS: &str = "RUNTIME_NOT_NODEJS";
    pub const ENTRY_OUTSIDE_PROJECT_ROOT: &str = "ENTRY_OUTSIDE_PROJECT_ROOT";
    pub const FUNCTION_PROPS_INVALID: &str = "FUNCTION_PROPS_INVALID";
    pub const BUNDLE_FAILED: &str = "BUNDLE_FAILED";
}

/// Optional settings for one function, as written in a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FunctionProps {
    /// Explicit entry file, relative to the defining file's directory.
    #[serde(default)]
    pub entry: Option<PathBuf>,
    /// Exported handler name, or a full `file.export` handler.
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default)]
    pub runtime: Option<Runtime>,
    #[serde(default)]
    pub deps_lock_file_path: Option<PathBuf>,
    #[serde(default)]
    pub project_root: Option<PathBuf>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    /// Defaults to true.
    #[serde(default)]
    pub aws_sdk_connection_reuse: Option<bool>,
    #[serde(default)]
    pub vpc: Option<VpcConfig>,
    #[serde(default)]
    pub memory_size: Option<u32>,
    #[serde(default)]
    pub timeout_seconds: Option<u32>,
}

/// Everything needed to deploy one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionPlan {
    pub schema_version: u32,
    pub id: String,
    pub entry: ResolvedEntry,
    pub handler: String,
    pub runtime: Runtime,
    pub lock_file: LockFile,
    pub install_command: String,
    pub project_root: PathBuf,
    pub environment: BTreeMap<String, String>,
    pub vpc: Option<VpcAttachment>,
    pub memory_size: u32,
    pub timeout_seconds: u32,
    pub code: BundleOutput,
}

/// Function planning error.
#[derive(Error, Debug)]
pub enum FunctionError {
    #[error(transparent)]
    Entry(#[from] EntryError),

    #[error(transparent)]
    LockFile(#[from] LockFileError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Vpc(#[from] VpcError),

    #[error("Only `NODEJS` runtimes are supported (got {runtime}).")]
    RuntimeNotNodejs { runtime: String },

    #[error("`entry` must be located inside `projectRoot`: {entry} is not under {project_root}")]
    EntryOutsideProjectRoot {
        entry: PathBuf,
        project_root: PathBuf,
    },

    #[error("invalid function properties: {reason}")]
    PropsInvalid { reason: String },

    #[error(transparent)]
    Bundle(#[from] BundleError),
}

impl FunctionError {
    /// Get the stable error code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Entry(e) => e.code(),
            Self::LockFile(e) => e.code(),
            Self::Environment(e) => e.code(),
            Self::Vpc(e) => e.code(),
            Self::RuntimeNotNodejs { .. } => codes::RUNTIME_NOT_NODEJS,
            Self::EntryOutsideProjectRoot { .. } => codes::ENTRY_OUTSIDE_PROJECT_ROOT,
            Self::PropsInvalid { .. } => codes::FUNCTION_PROPS_INVALID,
            Self::Bundle(_) => codes::BUNDLE_FAILED,
        }
    }

    /// Whether the error comes from bad input rather than the environment.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Self::Entry(EntryError::Io { .. }) | Self::LockFile(LockFileError::Io { .. }) | Self::Bundle(_)
        )
    }
}

/// Plans functions defined in one caller file.
pub struct FunctionBuilder<'a> {
    caller_file: PathBuf,
    cwd: PathBuf,
    bundler: &'a dyn Bundler,
}

impl<'a> FunctionBuilder<'a> {
    /// `caller_file` is the file defining the functions; relative paths are
    /// taken from `cwd`. Lock file discovery also starts at `cwd`.
    #[must_use]
    pub fn new(caller_file: &Path, cwd: &Path, bundler: &'a dyn Bundler) -> Self {
        Self {
            caller_file: absolutize(cwd, caller_file),
            cwd: cwd.to_path_buf(),
            bundler,
        }
    }

    #[must_use]
    pub fn caller_file(&self) -> &Path {
        &self.caller_file
    }

    /// Validate `props` for construct `id` and run the bundler.
    ///
    /// # Errors
    /// Returns the first failing step: runtime, entry, lock file, project
    /// root, handler, environment, VPC, sizing, or bundling.
    pub fn build(&self, id: &str, props: &FunctionProps) -> Result<FunctionPlan, FunctionError> {
        let runtime = props.runtime.clone().unwrap_or_default();
        if runtime.family() != RuntimeFamily::Nodejs {
            return Err(FunctionError::RuntimeNotNodejs {
                runtime: runtime.name().to_string(),
            });
        }

        let request =
            ResolutionRequest::from_caller(&self.caller_file, id).with_entry(props.entry.clone());
        let entry = resolve_entry(&request)?;

        let lock_file = find_lock_file(props.deps_lock_file_path.as_deref(), &self.cwd)?;

        let project_root = props
            .project_root
            .as_deref()
            .map_or_else(|| lock_file.dir().to_path_buf(), |root| absolutize(&self.cwd, root));
        if !is_within(&entry.path, &project_root) {
            return Err(FunctionError::EntryOutsideProjectRoot {
                entry: entry.path.clone(),
                project_root,
            });
        }

        let handler = handler_name(props.handler.as_deref())?;

        let environment = build_environment(
            &props.environment,
            &runtime,
            props.aws_sdk_connection_reuse.unwrap_or(true),
        )?;

        let vpc = match &props.vpc {
            Some(config) => attach(id, config)?,
            None => None,
        };

        let memory_size = checked(
            "memorySize",
            props.memory_size,
            DEFAULT_MEMORY_SIZE_MB,
            &MEMORY_SIZE_RANGE_MB,
        )?;
        let timeout_seconds = checked(
            "timeoutSeconds",
            props.timeout_seconds,
            DEFAULT_TIMEOUT_SECONDS,
            &TIMEOUT_RANGE_SECONDS,
        )?;

        let code = self.bundler.bundle(&BundleRequest {
            entry: entry.path.clone(),
            project_root: project_root.clone(),
            lock_file: lock_file.path.clone(),
            package_manager: lock_file.package_manager,
            runtime: runtime.clone(),
        })?;

        Ok(FunctionPlan {
            schema_version: FUNCTION_PLAN_SCHEMA_VERSION,
            id: id.to_string(),
            install_command: lock_file.package_manager.install_command().to_string(),
            entry,
            handler,
            runtime,
            lock_file,
            project_root,
            environment,
            vpc,
            memory_size,
            timeout_seconds,
            code,
        })
    }
}

/// `handler` → `index.handler`; `main.run` stays as is.
fn handler_name(handler: Option<&str>) -> Result<String, FunctionError> {
    let handler = handler.unwrap_or(DEFAULT_HANDLER).trim();
    if handler.is_empty() {
        return Err(FunctionError::PropsInvalid {
            reason: "handler must not be empty".to_string(),
        });
    }

    if handler.contains('.') {
        Ok(handler.to_string())
    } else {
        Ok(format!("index.{handler}"))
    }
}

fn checked(
    name: &str,
    value: Option<u32>,
    default: u32,
    range: &std::ops::RangeInclusive<u32>,
) -> Result<u32, FunctionError> {
    let value = value.unwrap_or(default);
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(FunctionError::PropsInvalid {
            reason: format!(
                "{name} must be between {} and {}, got {value}",
                range.start(),
                range.end()
            ),
        })
    }
}

/// Compare through canonical paths when possible so `/var` vs `/private/var`
/// style aliases don't cause false negatives.
fn is_within(path: &Path, root: &Path) -> bool {
    let canonical = |p: &Path| dunce::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());
    path.starts_with(root) || canonical(path).starts_with(canonical(root))
}
