//! Robot asset bundle staging for simulation loaders.
//!
//! Robot description documents exported from CAD and packaging tools refer
//! to their mesh files through a `package://<name>/meshes/` URI scheme.
//! Simulation asset loaders that only understand filesystem paths cannot
//! resolve those references. This crate stages a loader-ready copy of the
//! bundle under a scratch directory: the meshes directory is symlinked in
//! and the document is rewritten with relative paths, without touching the
//! source bundle.

pub mod error;
pub mod stage;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::AssetError;
pub use stage::{StageConfig, stage};
