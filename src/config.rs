//! Controller configuration and the central controller component.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::intent::{FrameInput, PlatformerIntent};
use crate::jump::{JumpKind, JumpState};
use crate::sensor::GroundProbe;

/// Tunable parameters for a platformer character.
///
/// Distances are in world units (meters by default), times in seconds.
/// Use [`ControllerConfig::scaled`] for pixel-space worlds.
///
/// A config only reaches a controller through [`PlatformerController::new`]
/// or [`PlatformerController::reconfigure`], which both run
/// [`ControllerConfig::validate`].
#[derive(Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    // === Movement ===
    /// Top horizontal speed (units/second).
    pub move_speed: f32,
    /// Horizontal acceleration toward the target speed while there is input (units/second^2).
    pub acceleration: f32,
    /// Horizontal deceleration toward rest without input (units/second^2).
    pub deceleration: f32,

    // === Jump ===
    /// Upward velocity change of a ground jump (units/second).
    ///
    /// Applied as an impulse on a unit-mass body, so the launch speed does
    /// not depend on the collider's mass. A Rapier body with a 0.8 x 1.0
    /// cuboid (about 0.8 kg at default density) still leaves at exactly
    /// `jump_force`; scale it yourself if you want heavier bodies to jump lower.
    pub jump_force: f32,
    /// Grace period after leaving the ground during which a jump is still a ground jump.
    pub coyote_time: f32,
    /// How long an early jump press is remembered.
    pub jump_buffer_time: f32,
    /// Gravity multiplier while rising with jump released.
    pub low_jump_multiplier: f32,
    /// Gravity multiplier while falling.
    pub fall_multiplier: f32,
    /// Total jumps per airborne period, including the ground jump.
    pub max_jumps: u32,
    /// Air jump launch speed relative to `jump_force`.
    pub air_jump_multiplier: f32,

    // === Ground check ===
    /// Radius of the ground probe circle.
    pub ground_check_radius: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            acceleration: 60.0,
            deceleration: 70.0,

            jump_force: 13.0,
            coyote_time: 0.1,
            jump_buffer_time: 0.1,
            low_jump_multiplier: 2.0,
            fall_multiplier: 2.5,
            max_jumps: 1,
            air_jump_multiplier: 1.0,

            ground_check_radius: 0.15,
        }
    }
}

impl ControllerConfig {
    /// Preset with one air jump at slightly reduced power.
    pub fn double_jump() -> Self {
        Self {
            max_jumps: 2,
            air_jump_multiplier: 0.85,
            ..default()
        }
    }

    /// Check every invariant. This is the only boundary where a config is rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("move_speed", self.move_speed),
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("jump_force", self.jump_force),
            ("coyote_time", self.coyote_time),
            ("jump_buffer_time", self.jump_buffer_time),
            ("low_jump_multiplier", self.low_jump_multiplier),
            ("fall_multiplier", self.fall_multiplier),
            ("air_jump_multiplier", self.air_jump_multiplier),
            ("ground_check_radius", self.ground_check_radius),
        ];

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if self.max_jumps == 0 {
            return Err(ConfigError::NoJumps);
        }

        Ok(())
    }

    /// Parse a config from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_toml_str(&std::fs::read_to_string(path)?)?;
        info!("Loaded controller config from {:?}", path);
        Ok(config)
    }

    /// Scale distances and speeds from meters to `units_per_meter` world units.
    pub fn scaled(mut self, units_per_meter: f32) -> Self {
        self.move_speed *= units_per_meter;
        self.acceleration *= units_per_meter;
        self.deceleration *= units_per_meter;
        self.jump_force *= units_per_meter;
        self.ground_check_radius *= units_per_meter;
        self
    }

    /// Builder: set movement parameters.
    pub fn with_movement(mut self, move_speed: f32, acceleration: f32, deceleration: f32) -> Self {
        self.move_speed = move_speed;
        self.acceleration = acceleration;
        self.deceleration = deceleration;
        self
    }

    /// Builder: set jump force.
    pub fn with_jump_force(mut self, force: f32) -> Self {
        self.jump_force = force;
        self
    }

    /// Builder: set coyote time.
    pub fn with_coyote_time(mut self, time: f32) -> Self {
        self.coyote_time = time;
        self
    }

    /// Builder: set jump buffer time.
    pub fn with_jump_buffer_time(mut self, time: f32) -> Self {
        self.jump_buffer_time = time;
        self
    }

    /// Builder: set low jump and fall gravity multipliers.
    pub fn with_gravity_multipliers(mut self, low_jump: f32, fall: f32) -> Self {
        self.low_jump_multiplier = low_jump;
        self.fall_multiplier = fall;
        self
    }

    /// Builder: set max jumps.
    pub fn with_max_jumps(mut self, max_jumps: u32) -> Self {
        self.max_jumps = max_jumps;
        self
    }

    /// Builder: set air jump multiplier.
    pub fn with_air_jump_multiplier(mut self, multiplier: f32) -> Self {
        self.air_jump_multiplier = multiplier;
        self
    }

    /// Builder: set ground check radius.
    pub fn with_ground_check_radius(mut self, radius: f32) -> Self {
        self.ground_check_radius = radius;
        self
    }
}

/// Core platformer controller component.
///
/// Owns the validated config, the jump state and the result of the last
/// ground check. Spawning it pulls in a neutral [`PlatformerIntent`], an
/// empty [`FrameInput`] and the default [`GroundProbe`] unless you supply
/// your own.
///
/// # Example
///
/// ```rust
/// use platformer_controller::prelude::*;
///
/// let controller = PlatformerController::new(ControllerConfig::double_jump()).unwrap();
/// assert_eq!(controller.jumps_remaining(), 2);
/// assert!(!controller.is_grounded());
///
/// assert!(PlatformerController::new(ControllerConfig::default().with_max_jumps(0)).is_err());
/// ```
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[require(PlatformerIntent, FrameInput, GroundProbe)]
pub struct PlatformerController {
    config: ControllerConfig,
    /// Coyote, buffer and budget state.
    pub jump: JumpState,
    /// Result of this frame's ground check.
    pub grounded: bool,
    /// Gravity the physics engine applies to this body.
    ///
    /// Kept in sync by the physics backend; used by fall shaping.
    pub gravity: Vec2,
    /// Jump fired this frame, if any.
    pub last_jump: Option<JumpKind>,
}

impl PlatformerController {
    /// Create a controller, rejecting an invalid config.
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            jump: JumpState::new(&config),
            config,
            grounded: false,
            gravity: Vec2::new(0.0, -9.81),
            last_jump: None,
        })
    }

    /// Builder: set gravity.
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// The active config.
    #[inline]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Replace the config. Takes effect on the next tick.
    ///
    /// On error the previous config stays active.
    pub fn reconfigure(&mut self, config: ControllerConfig) -> Result<(), ConfigError> {
        if let Err(err) = config.validate() {
            warn!("Rejected controller reconfiguration: {err}");
            return Err(err);
        }
        self.jump.budget.clamp_to(config.max_jumps);
        self.config = config;
        Ok(())
    }

    /// Steps 1 and 2 of the frame: countdowns and buffer re-arming.
    pub fn advance_timers(&mut self, dt: f32, input: &FrameInput) {
        self.last_jump = None;
        self.jump.advance(dt, input.jump_pressed, &self.config);
    }

    /// Step 3: record the ground check. Returns `true` on a positive check.
    pub fn report_ground(&mut self, grounded: bool) -> bool {
        self.grounded = grounded;
        if grounded {
            self.jump.land(&self.config);
        }
        grounded
    }

    /// Steps 4 and 5: fire a jump if one is allowed.
    pub fn try_jump(&mut self) -> Option<JumpKind> {
        let kind = self.jump.try_jump(&self.config);
        self.last_jump = kind;
        kind
    }

    /// Whether the last ground check found ground.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Jumps left before the next landing.
    #[inline]
    pub fn jumps_remaining(&self) -> u32 {
        self.jump.budget.remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_config_is_valid() {
        assert!(ControllerConfig::default().validate().is_ok());
        assert!(ControllerConfig::double_jump().validate().is_ok());
    }

    #[rstest]
    #[case(ControllerConfig::default().with_movement(-1.0, 60.0, 70.0), "move_speed")]
    #[case(ControllerConfig::default().with_coyote_time(-0.1), "coyote_time")]
    #[case(ControllerConfig::default().with_ground_check_radius(-0.15), "ground_check_radius")]
    #[case(ControllerConfig::default().with_gravity_multipliers(2.0, -1.0), "fall_multiplier")]
    fn negative_values_rejected(#[case] config: ControllerConfig, #[case] expected: &str) {
        match config.validate() {
            Err(ConfigError::Negative { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected Negative error, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_rejected() {
        let config = ControllerConfig::default().with_jump_force(f32::NAN);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite {
                field: "jump_force",
                ..
            })
        ));

        let config = ControllerConfig::default().with_jump_buffer_time(f32::INFINITY);
        assert!(matches!(config.validate(), Err(ConfigError::NonFinite { .. })));
    }

    #[test]
    fn zero_max_jumps_rejected() {
        let config = ControllerConfig::default().with_max_jumps(0);
        assert!(matches!(config.validate(), Err(ConfigError::NoJumps)));
    }

    #[test]
    fn toml_partial_config_keeps_defaults() {
        let config = ControllerConfig::from_toml_str(
            r#"
            move_speed = 10.0
            max_jumps = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.move_speed, 10.0);
        assert_eq!(config.max_jumps, 3);
        assert_eq!(config.jump_force, ControllerConfig::default().jump_force);
    }

    #[test]
    fn toml_invalid_values_rejected() {
        assert!(matches!(
            ControllerConfig::from_toml_str("max_jumps = 0"),
            Err(ConfigError::NoJumps)
        ));
        assert!(matches!(
            ControllerConfig::from_toml_str("move_speed = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn toml_round_trips_through_serde() {
        let config = ControllerConfig::double_jump().with_coyote_time(0.2);
        let text = toml::to_string(&config).unwrap();
        assert_eq!(ControllerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = ControllerConfig::from_toml_file("/nonexistent/controller.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn scaled_config() {
        let config = ControllerConfig::default().scaled(100.0);
        assert_eq!(config.move_speed, 800.0);
        assert_eq!(config.jump_force, 1300.0);
        assert_eq!(config.coyote_time, 0.1);
        assert_eq!(config.max_jumps, 1);
    }

    #[test]
    fn controller_new_validates() {
        let controller = PlatformerController::new(ControllerConfig::default()).unwrap();
        assert_eq!(controller.jumps_remaining(), 1);
        assert!(!controller.is_grounded());
        assert!(controller.last_jump.is_none());

        assert!(PlatformerController::new(ControllerConfig::default().with_jump_force(-1.0)).is_err());
    }

    #[test]
    fn reconfigure_clamps_budget() {
        let mut controller = PlatformerController::new(ControllerConfig::default().with_max_jumps(3)).unwrap();
        assert_eq!(controller.jumps_remaining(), 3);

        controller.reconfigure(ControllerConfig::default()).unwrap();
        assert_eq!(controller.jumps_remaining(), 1);
        assert_eq!(controller.config().max_jumps, 1);
    }

    #[test]
    fn rejected_reconfigure_keeps_previous_config() {
        let mut controller = PlatformerController::new(ControllerConfig::double_jump()).unwrap();
        let result = controller.reconfigure(ControllerConfig::default().with_max_jumps(0));

        assert!(result.is_err());
        assert_eq!(controller.config(), &ControllerConfig::double_jump());
    }

    #[test]
    fn frame_steps_fire_ground_jump() {
        let mut controller = PlatformerController::new(ControllerConfig::default()).unwrap();
        let press = FrameInput {
            jump_pressed: true,
            jump_held: true,
            ..default()
        };

        controller.advance_timers(1.0 / 60.0, &press);
        assert!(controller.report_ground(true));
        assert_eq!(controller.try_jump(), Some(JumpKind::Ground));
        assert_eq!(controller.last_jump, Some(JumpKind::Ground));

        controller.advance_timers(1.0 / 60.0, &FrameInput::NEUTRAL);
        assert!(controller.last_jump.is_none());
        assert_eq!(controller.try_jump(), None);
    }
}
