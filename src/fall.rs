//! Fall shaping.
//!
//! Extra gravity layered on top of the physics engine's own: falling is
//! snappier than rising, and releasing jump while rising cuts the jump short.

use bevy::prelude::*;

use crate::config::ControllerConfig;

/// Vertical speeds within this band are left alone.
pub const VERTICAL_EPSILON: f32 = 0.01;

/// Adjust `velocity` for one frame of `dt` seconds.
///
/// `gravity_y` is the signed vertical gravity the physics engine already
/// applies (negative for down). The returned correction is additive:
/// - falling: `gravity_y * (fall_multiplier - 1) * dt`
/// - rising with jump released: `gravity_y * (low_jump_multiplier - 1) * dt`
pub fn shape_fall(
    velocity: Vec2,
    gravity_y: f32,
    jump_held: bool,
    config: &ControllerConfig,
    dt: f32,
) -> Vec2 {
    let multiplier = if velocity.y < -VERTICAL_EPSILON {
        config.fall_multiplier
    } else if velocity.y > VERTICAL_EPSILON && !jump_held {
        config.low_jump_multiplier
    } else {
        return velocity;
    };

    velocity + Vec2::Y * (gravity_y * (multiplier - 1.0) * dt)
}
