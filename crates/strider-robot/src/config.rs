//! Declarative robot configuration records.
//!
//! These records are pure data: constructed once at startup, validated,
//! and handed by value to the consuming simulation framework. The only
//! behavior attached is default-value population and validation.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_orientation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}
const fn default_true() -> bool {
    true
}
const fn default_soft_limit_factor() -> f32 {
    0.9
}
const fn default_position_iterations() -> u32 {
    8
}
const fn default_velocity_iterations() -> u32 {
    4
}
const fn default_max_velocity() -> f32 {
    1000.0
}
const fn default_max_depenetration_velocity() -> f32 {
    1.0
}
const fn default_armature() -> f32 {
    0.01
}

// ---------------------------------------------------------------------------
// GroupValue
// ---------------------------------------------------------------------------

/// A group parameter that is either shared by every joint in the group or
/// specified per joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupValue {
    /// One value for every joint in the group.
    Uniform(f32),
    /// Individual values keyed by joint name.
    PerJoint(HashMap<String, f32>),
}

impl Default for GroupValue {
    fn default() -> Self {
        Self::Uniform(0.0)
    }
}

impl From<f32> for GroupValue {
    fn from(value: f32) -> Self {
        Self::Uniform(value)
    }
}

impl From<HashMap<String, f32>> for GroupValue {
    fn from(map: HashMap<String, f32>) -> Self {
        Self::PerJoint(map)
    }
}

impl<'a, const N: usize> From<[(&'a str, f32); N]> for GroupValue {
    fn from(entries: [(&'a str, f32); N]) -> Self {
        Self::PerJoint(
            entries
                .into_iter()
                .map(|(joint, value)| (joint.into(), value))
                .collect(),
        )
    }
}

impl GroupValue {
    /// Effective value for one joint. `None` if a per-joint table has no
    /// entry for it.
    pub fn resolve(&self, joint: &str) -> Option<f32> {
        match self {
            Self::Uniform(value) => Some(*value),
            Self::PerJoint(map) => map.get(joint).copied(),
        }
    }

    fn has_negative(&self) -> bool {
        match self {
            Self::Uniform(value) => *value < 0.0,
            Self::PerJoint(map) => map.values().any(|value| *value < 0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// InitStateConfig
// ---------------------------------------------------------------------------

/// Initial base pose and joint state of the robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitStateConfig {
    /// Base position `[x, y, z]` in meters.
    #[serde(default)]
    pub pos: [f32; 3],
    /// Base orientation quaternion `[x, y, z, w]`.
    #[serde(default = "default_orientation")]
    pub rot: [f32; 4],
    /// Default joint angles (rad). Joints not listed start at 0.
    #[serde(default)]
    pub joint_pos: HashMap<String, f32>,
    /// Default joint velocities (rad/s). Joints not listed start at 0.
    #[serde(default)]
    pub joint_vel: HashMap<String, f32>,
}

impl Default for InitStateConfig {
    fn default() -> Self {
        Self {
            pos: [0.0; 3],
            rot: default_orientation(),
            joint_pos: HashMap::default(),
            joint_vel: HashMap::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// ActuatorGroupConfig
// ---------------------------------------------------------------------------

/// A named set of joints sharing control-gain parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActuatorGroupConfig {
    /// Joints driven by this group.
    pub joints: Vec<String>,
    /// PD stiffness (Nm/rad).
    #[serde(default)]
    pub stiffness: GroupValue,
    /// PD damping (Nm*s/rad).
    #[serde(default)]
    pub damping: GroupValue,
    /// Peak effort (Nm).
    #[serde(default)]
    pub effort_limit: GroupValue,
    /// Peak velocity (rad/s).
    #[serde(default)]
    pub velocity_limit: GroupValue,
    /// Reflected rotor inertia (kg*m^2).
    #[serde(default = "default_armature")]
    pub armature: f32,
}

impl ActuatorGroupConfig {
    /// Create a group driving the given joints, with zeroed gains.
    pub fn new<I, S>(joints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            joints: joints.into_iter().map(Into::into).collect(),
            stiffness: GroupValue::default(),
            damping: GroupValue::default(),
            effort_limit: GroupValue::default(),
            velocity_limit: GroupValue::default(),
            armature: default_armature(),
        }
    }

    /// Builder: set uniform or per-joint stiffness.
    pub fn with_stiffness(mut self, value: impl Into<GroupValue>) -> Self {
        self.stiffness = value.into();
        self
    }

    /// Builder: set uniform or per-joint damping.
    pub fn with_damping(mut self, value: impl Into<GroupValue>) -> Self {
        self.damping = value.into();
        self
    }

    /// Builder: set uniform or per-joint peak effort.
    pub fn with_effort_limit(mut self, value: impl Into<GroupValue>) -> Self {
        self.effort_limit = value.into();
        self
    }

    /// Builder: set uniform or per-joint peak velocity.
    pub fn with_velocity_limit(mut self, value: impl Into<GroupValue>) -> Self {
        self.velocity_limit = value.into();
        self
    }

    /// Builder: set reflected rotor inertia.
    pub fn with_armature(mut self, armature: f32) -> Self {
        self.armature = armature;
        self
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        for (field, value) in [
            ("stiffness", &self.stiffness),
            ("damping", &self.damping),
            ("effort_limit", &self.effort_limit),
            ("velocity_limit", &self.velocity_limit),
        ] {
            if value.has_negative() {
                return Err(ConfigError::NegativeValue {
                    group: name.into(),
                    field: field.into(),
                });
            }
            if let GroupValue::PerJoint(map) = value {
                for joint in map.keys() {
                    if !self.joints.contains(joint) {
                        return Err(ConfigError::InvalidValue {
                            field: format!("actuators.{name}.{field}"),
                            message: format!("per-joint entry '{joint}' is not a group member"),
                        });
                    }
                }
            }
        }
        if self.armature < 0.0 {
            return Err(ConfigError::NegativeValue {
                group: name.into(),
                field: "armature".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SolverConfig
// ---------------------------------------------------------------------------

/// Articulation solver settings forwarded to the loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Enable collisions between links of the same robot.
    #[serde(default = "default_true")]
    pub self_collisions: bool,
    #[serde(default = "default_position_iterations")]
    pub position_iterations: u32,
    #[serde(default = "default_velocity_iterations")]
    pub velocity_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            self_collisions: true,
            position_iterations: default_position_iterations(),
            velocity_iterations: default_velocity_iterations(),
        }
    }
}

// ---------------------------------------------------------------------------
// RigidBodyConfig
// ---------------------------------------------------------------------------

/// Rigid-body properties forwarded to the loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBodyConfig {
    #[serde(default)]
    pub disable_gravity: bool,
    #[serde(default)]
    pub retain_accelerations: bool,
    #[serde(default)]
    pub linear_damping: f32,
    #[serde(default)]
    pub angular_damping: f32,
    #[serde(default = "default_max_velocity")]
    pub max_linear_velocity: f32,
    #[serde(default = "default_max_velocity")]
    pub max_angular_velocity: f32,
    #[serde(default = "default_max_depenetration_velocity")]
    pub max_depenetration_velocity: f32,
}

impl Default for RigidBodyConfig {
    fn default() -> Self {
        Self {
            disable_gravity: false,
            retain_accelerations: false,
            linear_damping: 0.0,
            angular_damping: 0.0,
            max_linear_velocity: default_max_velocity(),
            max_angular_velocity: default_max_velocity(),
            max_depenetration_velocity: default_max_depenetration_velocity(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoaderConfig
// ---------------------------------------------------------------------------

/// Parameters for loading the staged description document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Path to the staged description document. Filled in by the staging
    /// step; empty until then.
    #[serde(default)]
    pub asset_path: PathBuf,
    /// Pin the base link to the world instead of spawning it floating.
    #[serde(default)]
    pub fix_base: bool,
    #[serde(default = "default_true")]
    pub activate_contact_sensors: bool,
    /// Replace cylinder collision shapes with capsules at load time.
    #[serde(default = "default_true")]
    pub replace_cylinders_with_capsules: bool,
    /// Loader-level joint drive stiffness. Kept at zero: gains come from
    /// the actuator groups, not the loader.
    #[serde(default)]
    pub drive_stiffness: f32,
    /// Loader-level joint drive damping. Kept at zero, as above.
    #[serde(default)]
    pub drive_damping: f32,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub rigid_body: RigidBodyConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            asset_path: PathBuf::new(),
            fix_base: false,
            activate_contact_sensors: true,
            replace_cylinders_with_capsules: true,
            drive_stiffness: 0.0,
            drive_damping: 0.0,
            solver: SolverConfig::default(),
            rigid_body: RigidBodyConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// RobotConfig
// ---------------------------------------------------------------------------

/// Complete configuration record for one robot.
///
/// Constructed at startup (by a preset or from a TOML file), validated,
/// then passed by value to the consuming framework together with the
/// staged asset path in [`LoaderConfig::asset_path`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Robot name.
    pub name: String,
    /// Description-loading parameters.
    #[serde(default)]
    pub loader: LoaderConfig,
    /// Initial base pose and joint state.
    #[serde(default)]
    pub init_state: InitStateConfig,
    /// Actuator groups keyed by name.
    #[serde(default)]
    pub actuators: HashMap<String, ActuatorGroupConfig>,
    /// Joint ordering exposed to the control interface.
    #[serde(default)]
    pub sdk_joint_names: Vec<String>,
    /// Fraction of each joint's position limit range the controller may use.
    #[serde(default = "default_soft_limit_factor")]
    pub soft_joint_pos_limit_factor: f32,
}

impl RobotConfig {
    /// Validate the record. Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.soft_joint_pos_limit_factor <= 0.0 || self.soft_joint_pos_limit_factor > 1.0 {
            return Err(ConfigError::SoftLimitFactor(self.soft_joint_pos_limit_factor));
        }

        // Every joint belongs to exactly one actuator group.
        let mut owner: HashMap<&str, &str> = HashMap::new();
        for (group_name, group) in &self.actuators {
            if group.joints.is_empty() {
                return Err(ConfigError::EmptyGroup(group_name.clone()));
            }
            group.validate(group_name)?;
            for joint in &group.joints {
                if let Some(first) = owner.insert(joint.as_str(), group_name.as_str()) {
                    return Err(ConfigError::DuplicateJoint {
                        joint: joint.clone(),
                        first: first.into(),
                        second: group_name.clone(),
                    });
                }
            }
        }

        // The SDK ordering is exactly the set of driven joints.
        let mut seen = HashSet::new();
        for joint in &self.sdk_joint_names {
            if !seen.insert(joint.as_str()) {
                return Err(ConfigError::DuplicateSdkJoint(joint.clone()));
            }
            if !owner.contains_key(joint.as_str()) {
                return Err(ConfigError::UnknownJoint {
                    joint: joint.clone(),
                    context: "sdk_joint_names".into(),
                });
            }
        }
        for (joint, group) in &owner {
            if !seen.contains(joint) {
                return Err(ConfigError::UncoveredJoint {
                    joint: (*joint).into(),
                    group: (*group).into(),
                });
            }
        }

        // Initial joint state refers to driven joints only.
        for joint in self
            .init_state
            .joint_pos
            .keys()
            .chain(self.init_state.joint_vel.keys())
        {
            if !owner.contains_key(joint.as_str()) {
                return Err(ConfigError::UnknownJoint {
                    joint: joint.clone(),
                    context: "init_state".into(),
                });
            }
        }

        Ok(())
    }

    /// Load from TOML file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of controlled degrees of freedom.
    pub fn dof(&self) -> usize {
        self.sdk_joint_names.len()
    }

    /// The actuator group driving `joint`, with its name.
    pub fn actuator_group_for(&self, joint: &str) -> Option<(&str, &ActuatorGroupConfig)> {
        self.actuators
            .iter()
            .find(|(_, group)| group.joints.iter().any(|j| j == joint))
            .map(|(name, group)| (name.as_str(), group))
    }

    /// Effective PD stiffness for one joint.
    pub fn stiffness(&self, joint: &str) -> Option<f32> {
        self.actuator_group_for(joint)
            .and_then(|(_, group)| group.stiffness.resolve(joint))
    }

    /// Effective PD damping for one joint.
    pub fn damping(&self, joint: &str) -> Option<f32> {
        self.actuator_group_for(joint)
            .and_then(|(_, group)| group.damping.resolve(joint))
    }

    /// Effective peak effort for one joint.
    pub fn effort_limit(&self, joint: &str) -> Option<f32> {
        self.actuator_group_for(joint)
            .and_then(|(_, group)| group.effort_limit.resolve(joint))
    }

    /// Effective peak velocity for one joint.
    pub fn velocity_limit(&self, joint: &str) -> Option<f32> {
        self.actuator_group_for(joint)
            .and_then(|(_, group)| group.velocity_limit.resolve(joint))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
