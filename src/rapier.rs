//! Rapier2D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier2D.
//! Enable with the `rapier2d` feature.

use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;

use crate::backend::PlatformerPhysicsBackend;
use crate::config::PlatformerController;
use crate::sensor::GroundProbe;
use crate::PlatformerControllerSet;

/// Rapier2D physics backend for the platformer controller.
///
/// Velocity access goes through the [`Velocity`] component. The ground probe
/// and gravity sync are dedicated systems that receive Rapier state as
/// system parameters.
pub struct Rapier2dBackend;

impl PlatformerPhysicsBackend for Rapier2dBackend {
    type VelocityComponent = Velocity;

    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }
}

/// Plugin that sets up Rapier2D-specific systems for the controller.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            sync_rapier_gravity.in_set(PlatformerControllerSet::Setup),
        );
        app.add_systems(
            Update,
            rapier_ground_probe.in_set(PlatformerControllerSet::Sensors),
        );
    }
}

/// Copy Rapier's gravity (times the body's [`GravityScale`]) into each controller.
fn sync_rapier_gravity(
    q_config: Query<&RapierConfiguration>,
    mut q_controllers: Query<(&mut PlatformerController, Option<&GravityScale>)>,
) {
    let Ok(rapier_config) = q_config.single() else {
        return;
    };

    for (mut controller, gravity_scale) in &mut q_controllers {
        let gravity = rapier_config.gravity * gravity_scale.map_or(1.0, |s| s.0);
        if controller.gravity != gravity {
            controller.gravity = gravity;
        }
    }
}

/// Rapier-specific ground check: one ball overlap at the probe anchor.
///
/// The body itself and sensor colliders never count as ground. Collision
/// groups come from the probe, falling back to the body's own groups.
fn rapier_ground_probe(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<(
        Entity,
        &GlobalTransform,
        &GroundProbe,
        &mut PlatformerController,
        Option<&CollisionGroups>,
    )>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, probe, mut controller, body_groups) in &mut q_controllers {
        let groups = probe
            .collision_groups
            .map(|(memberships, filters)| {
                CollisionGroups::new(
                    Group::from_bits_truncate(memberships),
                    Group::from_bits_truncate(filters),
                )
            })
            .or_else(|| body_groups.cloned());

        let mut filter = QueryFilter::default()
            .exclude_rigid_body(entity)
            .exclude_sensors();
        if let Some(groups) = groups {
            filter = filter.groups(groups);
        }

        let position = transform.translation().xy();
        let radius = controller.config().ground_check_radius;
        let grounded = probe.probe(&controller.jump.timers, position, radius, |point, radius| {
            let mut hit = false;
            context.intersections_with_shape(point, 0.0, &Collider::ball(radius), filter, |_| {
                hit = true;
                // First hit is enough
                false
            });
            hit
        });

        controller.report_ground(grounded);
    }
}

/// Bundle for creating a character with Rapier2D physics.
///
/// Provides a dynamic body that never rotates and uses continuous collision
/// detection so fast falls do not tunnel through thin platforms. The collider
/// is frictionless by default; the controller owns horizontal speed.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use platformer_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         PlatformerController::new(ControllerConfig::default()).unwrap(),
///         KeyboardControls::default(),
///         Rapier2dCharacterBundle::new(),
///         Collider::cuboid(0.4, 0.5),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier2dCharacterBundle {
    /// The rigid body type. Should be [`RigidBody::Dynamic`] for characters.
    pub rigid_body: RigidBody,
    /// Current linear and angular velocity. Read and written by the controller.
    pub velocity: Velocity,
    /// Rotation is locked so the ground probe stays below the feet.
    pub locked_axes: LockedAxes,
    /// Continuous collision detection.
    pub ccd: Ccd,
    /// Characters never fall asleep while standing still.
    pub sleeping: Sleeping,
    /// Friction of the character's collider.
    pub friction: Friction,
}

impl Default for Rapier2dCharacterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier2dCharacterBundle {
    /// Create a new character bundle.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::zero(),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            ccd: Ccd::enabled(),
            sleeping: Sleeping::disabled(),
            friction: Friction {
                coefficient: 0.0,
                combine_rule: CoefficientCombineRule::Min,
            },
        }
    }

    /// Set the friction coefficient of the character's collider.
    pub fn with_friction(mut self, coefficient: f32) -> Self {
        self.friction.coefficient = coefficient;
        self
    }
}
