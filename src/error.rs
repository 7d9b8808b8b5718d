//! Error types.

use bevy::prelude::Entity;

/// Errors raised when a [`ControllerConfig`](crate::config::ControllerConfig)
/// fails validation or cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("`{field}` must be non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("`{field}` must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f32 },

    #[error("`max_jumps` must be at least 1")]
    NoJumps,

    #[error("failed to parse controller config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read controller config: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while wiring a controller into the world.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The entity carries a controller but no physics body for the backend.
    #[error("entity {0} has a PlatformerController but no physics body velocity component")]
    MissingBody(Entity),
}
