//! Ground sensor.
//!
//! The ground check is a single overlap test of a small circle placed just
//! below the body's feet. The physics query itself lives in the backend; this
//! module owns where the circle sits and when the query is allowed to run.

use bevy::prelude::*;

use crate::jump::JumpTimers;

/// Offset of the default probe anchor from the body origin.
pub const DEFAULT_PROBE_OFFSET: Vec2 = Vec2::new(0.0, -0.6);

/// GroundSensor contract: `false` without querying while the post-jump
/// cooldown is active, otherwise the result of `overlap`.
pub fn sense_ground(timers: &JumpTimers, overlap: impl FnOnce() -> bool) -> bool {
    if timers.ground_check_blocked() {
        return false;
    }
    overlap()
}

/// Where the ground check circle sits relative to the body.
///
/// Required by [`PlatformerController`](crate::config::PlatformerController);
/// when none is supplied at spawn the default anchor is created, offset
/// [`DEFAULT_PROBE_OFFSET`] below the body origin. Insert your own probe at
/// spawn time to place it elsewhere.
///
/// The radius is read from
/// [`ControllerConfig::ground_check_radius`](crate::config::ControllerConfig::ground_check_radius).
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct GroundProbe {
    /// Anchor position relative to the body origin.
    pub offset: Vec2,
    /// Collision groups (memberships, filters) the ground belongs to.
    ///
    /// `None` inherits the body's own collision groups, if it has any.
    pub collision_groups: Option<(u32, u32)>,
}

impl Default for GroundProbe {
    fn default() -> Self {
        Self {
            offset: DEFAULT_PROBE_OFFSET,
            collision_groups: None,
        }
    }
}

impl GroundProbe {
    /// Probe anchored at `offset` from the body origin.
    pub fn at(offset: Vec2) -> Self {
        Self {
            offset,
            ..default()
        }
    }

    /// Builder: only collide with the given groups.
    pub fn with_groups(mut self, memberships: u32, filters: u32) -> Self {
        self.collision_groups = Some((memberships, filters));
        self
    }

    /// Builder: scale the anchor offset (e.g. meters to pixels).
    pub fn scaled(mut self, units_per_meter: f32) -> Self {
        self.offset *= units_per_meter;
        self
    }

    /// World position of the probe for a body at `body_position`.
    ///
    /// Characters are rotation locked, so the offset is applied unrotated.
    #[inline]
    pub fn world_point(&self, body_position: Vec2) -> Vec2 {
        body_position + self.offset
    }

    /// Run the ground check for a body at `body_position`.
    ///
    /// `overlap(point, radius)` performs the physics query and is skipped
    /// entirely while the post-jump cooldown in `timers` is active.
    pub fn probe(
        &self,
        timers: &JumpTimers,
        body_position: Vec2,
        radius: f32,
        overlap: impl FnOnce(Vec2, f32) -> bool,
    ) -> bool {
        sense_ground(timers, || overlap(self.world_point(body_position), radius))
    }
}
