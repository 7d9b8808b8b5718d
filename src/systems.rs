//! Core controller systems.
//!
//! These systems glue the pure controller logic to the ECS. They are generic
//! over the physics backend so the same frame procedure runs on any engine.
//! Ordering is enforced by [`PlatformerControllerSet`](crate::PlatformerControllerSet).

use bevy::ecs::error::BevyError;
use bevy::input::gamepad::{Gamepad, GamepadButton};
use bevy::prelude::*;

use crate::backend::PlatformerPhysicsBackend;
use crate::config::{ControllerConfig, PlatformerController};
use crate::error::ControllerError;
use crate::fall;
use crate::intent::{FrameInput, KeyboardControls, PlatformerIntent};
use crate::jump::JumpKind;
use crate::motion;
use crate::state::{Airborne, Grounded};

/// Fail fast when a controller is spawned without a physics body.
pub fn verify_physics_body<B: PlatformerPhysicsBackend>(
    q_added: Query<(Entity, Has<B::VelocityComponent>), Added<PlatformerController>>,
) -> Result<(), BevyError> {
    for (entity, has_body) in &q_added {
        if !has_body {
            return Err(ControllerError::MissingBody(entity).into());
        }
    }
    Ok(())
}

/// Read keyboard and gamepad state into [`PlatformerIntent`] for entities
/// with [`KeyboardControls`].
pub fn read_keyboard_controls(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    q_gamepads: Query<&Gamepad>,
    mut q_controls: Query<(&KeyboardControls, &mut PlatformerIntent)>,
) {
    let gamepad = q_gamepads.iter().next();

    for (controls, mut intent) in &mut q_controls {
        let mut axis = keyboard.as_deref().map_or(0.0, |k| controls.axis(k));
        let mut held = keyboard.as_deref().is_some_and(|k| controls.jump_held(k));
        let mut tapped = keyboard.as_deref().is_some_and(|k| controls.jump_just_pressed(k));

        if let Some(gamepad) = gamepad.filter(|_| controls.use_gamepad) {
            axis += gamepad.left_stick().x;
            held |= gamepad.pressed(GamepadButton::South);
            tapped |= gamepad.just_pressed(GamepadButton::South);
        }

        intent.set_axis(axis);
        intent.set_jump_held(held);
        // Press and release between two frames leaves no held state behind
        if tapped {
            intent.press_jump();
        }
    }
}

/// Sample each intent into this frame's [`FrameInput`].
pub fn sample_frame_input(mut q_inputs: Query<(&mut PlatformerIntent, &mut FrameInput)>) {
    for (mut intent, mut input) in &mut q_inputs {
        *input = intent.sample();
    }
}

/// Decrement jump countdowns and re-arm the buffer on a press.
pub fn advance_jump_timers(
    time: Res<Time>,
    mut q_controllers: Query<(&mut PlatformerController, &FrameInput)>,
) {
    let dt = time.delta_secs();
    for (mut controller, input) in &mut q_controllers {
        controller.advance_timers(dt, input);
    }
}

/// Fire allowed jumps and launch the bodies.
///
/// Vertical velocity is zeroed before the impulse so every jump of a kind
/// leaves at the same speed.
pub fn resolve_jumps<B: PlatformerPhysicsBackend>(world: &mut World) {
    let launches: Vec<(Entity, JumpKind, Vec2)> = world
        .query::<(Entity, &mut PlatformerController)>()
        .iter_mut(world)
        .filter_map(|(entity, mut controller)| {
            let kind = controller.try_jump()?;
            Some((entity, kind, kind.impulse(controller.config())))
        })
        .collect();

    for (entity, kind, impulse) in launches {
        let velocity = B::get_velocity(world, entity);
        B::set_velocity(world, entity, Vec2::new(velocity.x, 0.0));
        B::apply_impulse(world, entity, impulse);
        debug!("{entity}: {kind:?} jump, launch speed {}", impulse.y);
    }
}

/// Apply fall and low-jump gravity on top of the engine's gravity.
pub fn apply_fall_shaping<B: PlatformerPhysicsBackend>(world: &mut World) {
    let dt = world
        .get_resource::<Time>()
        .map(|t| t.delta_secs())
        .unwrap_or(0.0);

    let bodies: Vec<(Entity, ControllerConfig, f32, bool)> = world
        .query::<(Entity, &PlatformerController, &FrameInput)>()
        .iter(world)
        .map(|(e, controller, input)| (e, *controller.config(), controller.gravity.y, input.jump_held))
        .collect();

    for (entity, config, gravity_y, jump_held) in bodies {
        let velocity = B::get_velocity(world, entity);
        let shaped = fall::shape_fall(velocity, gravity_y, jump_held, &config, dt);
        if shaped != velocity {
            B::set_velocity(world, entity, shaped);
        }
    }
}

/// Move horizontal velocity toward the input target. Runs on the fixed step.
pub fn integrate_horizontal_motion<B: PlatformerPhysicsBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    let bodies: Vec<(Entity, ControllerConfig, f32)> = world
        .query::<(Entity, &PlatformerController, &FrameInput)>()
        .iter(world)
        .map(|(e, controller, input)| (e, *controller.config(), input.axis))
        .collect();

    for (entity, config, axis) in bodies {
        let velocity = B::get_velocity(world, entity);
        let x = motion::integrate_horizontal(velocity.x, axis, &config, dt);
        B::set_velocity(world, entity, Vec2::new(x, velocity.y));
    }
}

/// Sync [`Grounded`] / [`Airborne`] markers with the last ground check.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(Entity, &PlatformerController, Has<Grounded>, Has<Airborne>)>,
) {
    for (entity, controller, has_grounded, has_airborne) in &q_controllers {
        if controller.is_grounded() {
            if !has_grounded {
                debug!("{entity}: landed");
                commands.entity(entity).insert(Grounded).remove::<Airborne>();
            }
        } else if !has_airborne {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }
    }
}
