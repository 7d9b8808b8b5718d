//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the platformer controller. The controller only needs a small
//! surface from the physics engine: read and write the body's velocity,
//! apply an instantaneous impulse, and run one overlap test per frame for
//! the ground check.

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// Velocity access and impulses go through the static methods below. The
/// ground overlap test needs engine-specific system parameters, so the
/// backend's [`plugin`](Self::plugin) must also:
/// - add a system to [`PlatformerControllerSet::Sensors`](crate::PlatformerControllerSet::Sensors)
///   that runs [`GroundProbe::probe`](crate::sensor::GroundProbe::probe) for every
///   controller and passes the result to
///   [`PlatformerController::report_ground`](crate::config::PlatformerController::report_ground),
/// - keep [`PlatformerController::gravity`](crate::config::PlatformerController::gravity)
///   equal to the gravity the engine applies to the body.
///
/// See the `rapier` module's `Rapier2dBackend` for a complete implementation.
pub trait PlatformerPhysicsBackend: 'static + Send + Sync {
    /// The velocity component type used by this backend.
    ///
    /// A controller spawned without it is rejected on its first frame.
    type VelocityComponent: Component;

    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec2;

    /// Set the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2);

    /// Apply an instantaneous impulse per unit mass, i.e. a velocity change
    /// visible to the rest of the frame. The body's actual mass is ignored.
    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec2) {
        let velocity = Self::get_velocity(world, entity);
        Self::set_velocity(world, entity, velocity + impulse);
    }

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }
}
