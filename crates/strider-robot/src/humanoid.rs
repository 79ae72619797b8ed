//! Configuration preset for the humanoid robot.
//!
//! Gains follow the hardware actuator layout: high-torque hip and knee
//! drives, mid-torque waist, light arm and head servos. The initial pose is
//! a slight crouch with relaxed arms, stable enough to stand when the
//! controller takes over.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use strider_assets::{StageConfig, stage};

use crate::config::{ActuatorGroupConfig, InitStateConfig, LoaderConfig, RobotConfig};
use crate::error::RobotError;

/// Standing height of the base above the ground (meters), from leg
/// kinematics in the crouched pose.
const BASE_HEIGHT: f32 = 0.78;

/// Joint name stems per leg, in control-interface order.
const LEG_STEMS: [&str; 6] = [
    "hip_pitch",
    "hip_roll",
    "hip_yaw",
    "knee",
    "ankle_pitch",
    "ankle_roll",
];

/// Joint name stems per arm, in control-interface order.
const ARM_STEMS: [&str; 5] = [
    "shoulder_pitch",
    "shoulder_roll",
    "elbow",
    "wrist_roll",
    "wrist_pitch",
];

fn joint(side: &str, stem: &str) -> String {
    format!("{side}_{stem}_joint")
}

/// Left and right instances of each stem.
fn both_sides(stems: &[&str]) -> Vec<String> {
    stems
        .iter()
        .flat_map(|&stem| ["left", "right"].map(|side| joint(side, stem)))
        .collect()
}

// ---------------------------------------------------------------------------
// Preset data
// ---------------------------------------------------------------------------

/// Joint ordering of the control interface: legs, waist, head, arms.
fn sdk_joint_names() -> Vec<String> {
    let mut names = Vec::with_capacity(26);
    for side in ["left", "right"] {
        for stem in LEG_STEMS {
            names.push(joint(side, stem));
        }
    }
    names.extend(
        ["waist_yaw_joint", "waist_roll_joint", "torso_joint", "head_joint"].map(String::from),
    );
    for side in ["right", "left"] {
        for stem in ARM_STEMS {
            names.push(joint(side, stem));
        }
    }
    names
}

/// Crouched standing pose with relaxed arms. Unlisted joints start at zero.
fn init_joint_pos() -> HashMap<String, f32> {
    let mut pos = HashMap::new();
    for side in ["left", "right"] {
        pos.insert(joint(side, "hip_pitch"), -0.15);
        pos.insert(joint(side, "knee"), 0.35);
        pos.insert(joint(side, "ankle_pitch"), -0.2);
        pos.insert(joint(side, "shoulder_pitch"), 0.3);
        pos.insert(joint(side, "elbow"), 0.6);
    }
    pos.insert("left_shoulder_roll_joint".into(), 0.2);
    pos.insert("right_shoulder_roll_joint".into(), -0.2);
    pos
}

fn actuator_groups() -> HashMap<String, ActuatorGroupConfig> {
    let mut groups = HashMap::new();

    // Hip pitch and yaw drives.
    groups.insert(
        "legs_main".into(),
        ActuatorGroupConfig::new(both_sides(&["hip_pitch", "hip_yaw"]))
            .with_stiffness(100.0)
            .with_damping(2.0)
            .with_effort_limit(88.0)
            .with_velocity_limit(32.0),
    );

    // Hip roll and knee carry the highest loads; the knee runs stiffer.
    groups.insert(
        "legs_roll_knee".into(),
        ActuatorGroupConfig::new(both_sides(&["hip_roll", "knee"]))
            .with_stiffness([
                ("left_hip_roll_joint", 100.0),
                ("right_hip_roll_joint", 100.0),
                ("left_knee_joint", 150.0),
                ("right_knee_joint", 150.0),
            ])
            .with_damping([
                ("left_hip_roll_joint", 2.0),
                ("right_hip_roll_joint", 2.0),
                ("left_knee_joint", 4.0),
                ("right_knee_joint", 4.0),
            ])
            .with_effort_limit(139.0)
            .with_velocity_limit(20.0),
    );

    groups.insert(
        "ankles".into(),
        ActuatorGroupConfig::new(both_sides(&["ankle_pitch", "ankle_roll"]))
            .with_stiffness(40.0)
            .with_damping(2.0)
            .with_effort_limit(35.0)
            .with_velocity_limit(30.0),
    );

    // The waist yaw drive is much stronger than the roll and torso joints.
    groups.insert(
        "waist".into(),
        ActuatorGroupConfig::new(["waist_yaw_joint", "waist_roll_joint", "torso_joint"])
            .with_stiffness([
                ("waist_yaw_joint", 200.0),
                ("waist_roll_joint", 40.0),
                ("torso_joint", 40.0),
            ])
            .with_damping(5.0)
            .with_effort_limit([
                ("waist_yaw_joint", 88.0),
                ("waist_roll_joint", 50.0),
                ("torso_joint", 50.0),
            ])
            .with_velocity_limit(32.0),
    );

    groups.insert(
        "head".into(),
        ActuatorGroupConfig::new(["head_joint"])
            .with_stiffness(20.0)
            .with_damping(1.0)
            .with_effort_limit(10.0)
            .with_velocity_limit(20.0),
    );

    groups.insert(
        "arms".into(),
        ActuatorGroupConfig::new(both_sides(&["shoulder_pitch", "shoulder_roll", "elbow"]))
            .with_stiffness(40.0)
            .with_damping(1.0)
            .with_effort_limit(25.0)
            .with_velocity_limit(37.0),
    );

    groups.insert(
        "wrists".into(),
        ActuatorGroupConfig::new(both_sides(&["wrist_roll", "wrist_pitch"]))
            .with_stiffness(20.0)
            .with_damping(1.0)
            .with_effort_limit(5.0)
            .with_velocity_limit(22.0),
    );

    groups
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Configuration record for the humanoid, without a staged asset path.
///
/// Use [`humanoid_staged`] to also stage the asset bundle and fill in
/// [`LoaderConfig::asset_path`].
pub fn humanoid() -> RobotConfig {
    RobotConfig {
        name: "humanoid".into(),
        loader: LoaderConfig::default(),
        init_state: InitStateConfig {
            pos: [0.0, 0.0, BASE_HEIGHT],
            joint_pos: init_joint_pos(),
            ..InitStateConfig::default()
        },
        actuators: actuator_groups(),
        sdk_joint_names: sdk_joint_names(),
        soft_joint_pos_limit_factor: 0.9,
    }
}

/// Staging parameters for the humanoid's asset bundle.
pub fn stage_config(
    source_dir: impl Into<PathBuf>,
    scratch_dir: impl Into<PathBuf>,
) -> StageConfig {
    StageConfig::new(source_dir, scratch_dir)
        .with_description("urdf/humanoid.urdf")
        .with_package_token("package://humanoid/meshes/")
        .with_output_name("humanoid.urdf")
}

/// Stage the humanoid's asset bundle under `scratch_dir` and return the
/// configuration record with the loader pointed at the staged description
/// document.
pub fn humanoid_staged(
    source_dir: impl AsRef<Path>,
    scratch_dir: impl AsRef<Path>,
) -> Result<RobotConfig, RobotError> {
    let staged = stage(&stage_config(source_dir.as_ref(), scratch_dir.as_ref()))?;
    let mut config = humanoid();
    config.loader.asset_path = staged;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
