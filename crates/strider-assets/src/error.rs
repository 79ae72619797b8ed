//! Error types for asset bundle staging.

use std::path::PathBuf;

/// Errors that can occur while staging a robot asset bundle.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// A required source path (bundle directory or description document)
    /// does not exist.
    #[error("missing asset at {path}: {source}")]
    MissingAsset {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to create or replace the staged meshes symlink.
    #[error("symlink error at {path}: {source}")]
    Symlink {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read, write, or remove a staged file.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
