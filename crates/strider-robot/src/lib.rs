//! Declarative robot configuration for simulation loaders.
//!
//! Provides the configuration records an external simulation framework
//! consumes to load and control a robot: initial pose, per-group actuator
//! gains and limits, control-interface joint ordering, and asset-loading
//! parameters. The [`humanoid`] module carries the concrete preset for the
//! humanoid robot, including staged asset loading via `strider-assets`.

pub mod config;
pub mod error;
pub mod humanoid;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use config::{
    ActuatorGroupConfig, GroupValue, InitStateConfig, LoaderConfig, RigidBodyConfig, RobotConfig,
    SolverConfig,
};
pub use error::{ConfigError, RobotError};
pub use humanoid::{humanoid, humanoid_staged};
