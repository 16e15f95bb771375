use std::path::PathBuf;
use thiserror::Error;

/// Core error type for nodefn operations outside function planning.
#[derive(Error, Debug)]
pub enum Error {
    /// Checking for the manifest failed for a reason other than absence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No nodefn.json found from {start}")]
    ManifestNotFound { start: PathBuf },
}

/// Stable error codes for [`Error`].
pub mod codes {
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const CONFIG_READ_FAILED: &str = "CONFIG_READ_FAILED";
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
    pub const MANIFEST_NOT_FOUND: &str = "MANIFEST_NOT_FOUND";
}

impl Error {
    /// Get the stable error code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => codes::IO_ERROR,
            Self::ConfigRead { .. } => codes::CONFIG_READ_FAILED,
            Self::ConfigParse { .. } => codes::CONFIG_INVALID,
            Self::ManifestNotFound { .. } => codes::MANIFEST_NOT_FOUND,
        }
    }

    /// Whether the error comes from bad input rather than the environment.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}
