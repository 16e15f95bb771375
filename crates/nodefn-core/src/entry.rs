//! Handler entry file resolution.
//!
//! An entry is either given explicitly (relative to the defining file's
//! directory) or discovered next to the defining file as
//! `<caller stem>.<construct id>.{ts,js,mjs}`.

use nodefn_util::fs::{absolutize, is_regular_file};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stable error codes for entry resolution.
pub mod codes {
    pub const ENTRY_UNSUPPORTED_EXTENSION: &str = "ENTRY_UNSUPPORTED_EXTENSION";
    pub const ENTRY_NOT_FOUND: &str = "ENTRY_NOT_FOUND";
    pub const HANDLER_NOT_FOUND: &str = "HANDLER_NOT_FOUND";
    pub const ENTRY_CONSTRUCT_ID_INVALID: &str = "ENTRY_CONSTRUCT_ID_INVALID";
    pub const ENTRY_IO: &str = "ENTRY_IO";
}

/// Auto-discovery search order. First match wins.
pub const DISCOVERY_EXTENSIONS: &[EntryExtension] =
    &[EntryExtension::Ts, EntryExtension::Js, EntryExtension::Mjs];

/// Extension of an accepted entry file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryExtension {
    Ts,
    Js,
    Mjs,
    Tsx,
}

impl EntryExtension {
    /// Parse an extension (without the leading dot).
    #[must_use]
    pub fn from_ext(ext: &str) -> Option<Self> {
        match ext {
            "ts" => Some(Self::Ts),
            "js" => Some(Self::Js),
            "mjs" => Some(Self::Mjs),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    /// Extension for `path`, if it is one we accept.
    #[must_use]
    pub fn of(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_ext)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ts => "ts",
            Self::Js => "js",
            Self::Mjs => "mjs",
            Self::Tsx => "tsx",
        }
    }

    /// Whether the entry needs TypeScript compilation.
    #[must_use]
    pub fn is_typescript(&self) -> bool {
        matches!(self, Self::Ts | Self::Tsx)
    }
}

impl fmt::Display for EntryExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for resolving one construct's entry.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    /// Construct identifier, e.g. `Fn`.
    pub construct_id: String,
    /// Explicit entry path (relative to `base_dir` or absolute).
    pub explicit_entry: Option<PathBuf>,
    /// Directory of the defining file. Search root for auto-discovery.
    pub base_dir: PathBuf,
    /// Defining file's name without its extension.
    pub caller_stem: String,
}

impl ResolutionRequest {
    /// Build a request from the defining (caller) source file.
    ///
    /// `my-stack.ts` in `/app/lib` gives `base_dir = /app/lib` and
    /// `caller_stem = my-stack`. A relative caller is taken against the
    /// process working directory, so `base_dir` is always absolute.
    #[must_use]
    pub fn from_caller(caller_file: &Path, construct_id: impl Into<String>) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let caller = absolutize(&cwd, caller_file);
        let base_dir = caller
            .parent()
            .map_or_else(|| caller.clone(), Path::to_path_buf);
        let caller_stem = caller_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            construct_id: construct_id.into(),
            explicit_entry: None,
            base_dir,
            caller_stem,
        }
    }

    /// Set an explicit entry.
    #[must_use]
    pub fn with_entry(mut self, entry: Option<PathBuf>) -> Self {
        self.explicit_entry = entry;
        self
    }

    /// The three auto-discovery candidates, in search order.
    #[must_use]
    pub fn candidates(&self) -> Vec<PathBuf> {
        DISCOVERY_EXTENSIONS
            .iter()
            .map(|ext| {
                absolutize(
                    &self.base_dir,
                    Path::new(&format!(
                        "{}.{}.{}",
                        self.caller_stem, self.construct_id, ext
                    )),
                )
            })
            .collect()
    }
}

/// A resolved handler entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    /// Absolute, lexically normalized path. Symlinks are not resolved.
    pub path: PathBuf,
    pub extension: EntryExtension,
}

/// Entry resolution error.
#[derive(Error, Debug)]
pub enum EntryError {
    #[error("Only JavaScript or TypeScript entry files are supported: {path}")]
    UnsupportedExtension { path: PathBuf },

    #[error("Cannot find entry file at {path}")]
    EntryNotFound { path: PathBuf },

    #[error("Cannot find handler file {}", join_candidates(.candidates))]
    HandlerNotFound { candidates: Vec<PathBuf> },

    #[error("construct id is invalid: {id:?}: {reason}")]
    InvalidConstructId { id: String, reason: &'static str },

    #[error("failed to stat {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EntryError {
    /// Get the stable error code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedExtension { .. } => codes::ENTRY_UNSUPPORTED_EXTENSION,
            Self::EntryNotFound { .. } => codes::ENTRY_NOT_FOUND,
            Self::HandlerNotFound { .. } => codes::HANDLER_NOT_FOUND,
            Self::InvalidConstructId { .. } => codes::ENTRY_CONSTRUCT_ID_INVALID,
            Self::Io { .. } => codes::ENTRY_IO,
        }
    }
}

/// `a, b or c`
fn join_candidates(candidates: &[PathBuf]) -> String {
    let shown: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
    match shown.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

/// Resolve the handler entry for a construct.
///
/// # Errors
/// Returns an error if:
/// - The construct id is empty or contains a path separator
/// - An explicit entry has an extension other than `.ts`, `.js`, `.mjs` or `.tsx`
/// - An explicit entry is not a regular file
/// - No auto-discovery candidate exists
/// - The filesystem fails for a reason other than absence
pub fn resolve_entry(request: &ResolutionRequest) -> Result<ResolvedEntry, EntryError> {
    validate_construct_id(&request.construct_id)?;

    match &request.explicit_entry {
        Some(entry) => resolve_explicit(&request.base_dir, entry),
        None => discover(request),
    }
}

fn validate_construct_id(id: &str) -> Result<(), EntryError> {
    let reason = if id.is_empty() {
        "must not be empty"
    } else if id.contains(['/', '\\']) {
        "must not contain a path separator"
    } else {
        return Ok(());
    };

    Err(EntryError::InvalidConstructId {
        id: id.to_string(),
        reason,
    })
}

fn resolve_explicit(base_dir: &Path, entry: &Path) -> Result<ResolvedEntry, EntryError> {
    // Extension first: a `.tsx` symlink is judged by its own name.
    let extension = EntryExtension::of(entry).ok_or_else(|| EntryError::UnsupportedExtension {
        path: entry.to_path_buf(),
    })?;

    let path = absolutize(base_dir, entry);
    if is_file_at(&path)? {
        Ok(ResolvedEntry { path, extension })
    } else {
        Err(EntryError::EntryNotFound { path })
    }
}

fn discover(request: &ResolutionRequest) -> Result<ResolvedEntry, EntryError> {
    let candidates = request.candidates();

    for (path, extension) in candidates.iter().zip(DISCOVERY_EXTENSIONS) {
        if is_file_at(path)? {
            return Ok(ResolvedEntry {
                path: path.clone(),
                extension: *extension,
            });
        }
    }

    Err(EntryError::HandlerNotFound { candidates })
}

fn is_file_at(path: &Path) -> Result<bool, EntryError> {
    is_regular_file(path).map_err(|source| EntryError::Io {
        path: path.to_path_buf(),
        source,
    })
}
