//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the File Manager
//!
//! Every failure a filesystem operation can surface maps onto one variant
//! here; the gateway translates raw `io::Error` kinds at the boundary and
//! nothing above it swallows an error. Operation outcomes carry these
//! variants all the way to the presentation layer.

use std::{io, path::Path, path::PathBuf};
use thiserror::Error;

/// Unified error type for all file manager operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Requested file or directory does not exist.
    #[error("File or directory not found: {0:?}")]
    NotFound(PathBuf),

    /// Permissions error for file/directory access.
    #[error("Permission denied: {0:?}")]
    PermissionDenied(PathBuf),

    /// Target name collides with an existing entry.
    #[error("Already exists: {0:?}")]
    AlreadyExists(PathBuf),

    /// Paste was requested with nothing yanked.
    #[error("Clipboard is empty")]
    EmptyClipboard,

    /// Pasting a directory into itself or one of its own descendants.
    #[error("Cannot paste {0:?} into itself or its own subdirectory")]
    SelfReferential(PathBuf),

    /// Move would cross filesystem boundaries.
    #[error("Cannot move {0:?} across filesystems")]
    CrossDeviceUnsupported(PathBuf),

    /// A tree operation stopped part-way; the target may be half-written.
    #[error("Operation on {path:?} partially completed: {reason}")]
    PartialFailure { path: PathBuf, reason: String },

    /// Operation cancelled before it touched anything.
    #[error("Operation was cancelled")]
    Cancelled,

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Config file I/O error with path.
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Terminal I/O or rendering error.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    /// Translate a raw `io::Error` for `path` into the taxonomy.
    #[must_use]
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_path_buf()),
            io::ErrorKind::CrossesDevices => Self::CrossDeviceUnsupported(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }

    /// Create a partial-failure error for an interrupted tree operation.
    pub fn partial<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::PartialFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True when retrying the same call with `overwrite = true` may succeed.
    #[must_use]
    pub const fn is_overwritable_collision(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

// Manual Clone implementation to handle the non-Clone io::Error fields.
impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            Self::Io(e) => Self::Io(io::Error::new(e.kind(), e.to_string())),
            Self::NotFound(path) => Self::NotFound(path.clone()),
            Self::PermissionDenied(path) => Self::PermissionDenied(path.clone()),
            Self::AlreadyExists(path) => Self::AlreadyExists(path.clone()),
            Self::EmptyClipboard => Self::EmptyClipboard,
            Self::SelfReferential(path) => Self::SelfReferential(path.clone()),
            Self::CrossDeviceUnsupported(path) => Self::CrossDeviceUnsupported(path.clone()),
            Self::PartialFailure { path, reason } => Self::PartialFailure {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::Cancelled => Self::Cancelled,
            Self::Config(e) => Self::Other(format!("Config error: {e}")),
            Self::ConfigIo { path, source } => Self::ConfigIo {
                path: path.clone(),
                source: io::Error::new(source.kind(), source.to_string()),
            },
            Self::Terminal(msg) => Self::Terminal(msg.clone()),
            Self::Other(msg) => Self::Other(msg.clone()),
        }
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}

impl From<yankr::YankError> for AppError {
    fn from(e: yankr::YankError) -> Self {
        match e {
            yankr::YankError::EmptySlot => Self::EmptyClipboard,
            yankr::YankError::NoFileName(path) => {
                Self::Other(format!("Path has no file name: {}", path.display()))
            }
        }
    }
}
