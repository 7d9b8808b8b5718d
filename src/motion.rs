//! Horizontal motion.

use crate::config::ControllerConfig;

/// Target speeds below this count as "no input" and use deceleration.
pub const TARGET_EPSILON: f32 = 0.01;

/// Move `current` toward `target` by at most `max_delta`, never overshooting.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// New horizontal velocity after one fixed step of `dt` seconds.
///
/// Linear approach toward `axis * move_speed` at `acceleration` while there is
/// input and `deceleration` otherwise. The vertical component is not touched.
pub fn integrate_horizontal(current: f32, axis: f32, config: &ControllerConfig, dt: f32) -> f32 {
    let target = axis * config.move_speed;
    let rate = if target.abs() > TARGET_EPSILON {
        config.acceleration
    } else {
        config.deceleration
    };
    move_towards(current, target, rate * dt)
}
