use thiserror::Error;

/// Top-level error type for strider-robot.
#[derive(Debug, Error)]
pub enum RobotError {
    #[error("Asset error: {0}")]
    Asset(#[from] strider_assets::AssetError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Actuator group '{0}' has no joints")]
    EmptyGroup(String),

    #[error("Joint '{joint}' is claimed by both '{first}' and '{second}'")]
    DuplicateJoint {
        joint: String,
        first: String,
        second: String,
    },

    #[error("Duplicate entry '{0}' in sdk_joint_names")]
    DuplicateSdkJoint(String),

    #[error("Joint '{joint}' in {context} is not driven by any actuator group")]
    UnknownJoint { joint: String, context: String },

    #[error("Joint '{joint}' of group '{group}' is missing from sdk_joint_names")]
    UncoveredJoint { joint: String, group: String },

    #[error("Actuator group '{group}' has negative {field}")]
    NegativeValue { group: String, field: String },

    #[error("soft_joint_pos_limit_factor must be in (0, 1], got {0}")]
    SoftLimitFactor(f32),
}
