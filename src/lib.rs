//! # `platformer_controller`
//!
//! A responsive 2D platformer character controller with physics backend abstraction.
//!
//! This crate turns raw per-frame input into horizontal motion and jumps on a
//! dynamic rigid body, and compensates for human timing:
//! - **Coyote time**: jumping shortly after walking off a ledge still counts
//!   as a ground jump
//! - **Jump buffering**: pressing jump shortly before landing jumps on landing
//! - **Air jumps**: a per-airborne-period budget for double/triple jumps
//! - **Fall shaping**: snappier falls and short hops when jump is released early
//! - Abstracts physics backend for easy swapping (Rapier2D included)
//!
//! ## Architecture
//!
//! Two cadences run side by side:
//! 1. Every frame (`Update`): sample input, tick the jump timers, run the
//!    ground probe, resolve jumps, shape the fall, sync state markers
//! 2. Every fixed step (`FixedUpdate`): move horizontal velocity toward the
//!    input target
//!
//! The jump, motion and fall logic is plain code over plain values (see
//! [`jump::JumpState`], [`motion::integrate_horizontal`], [`fall::shape_fall`])
//! and can be driven without Bevy's scheduler.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use platformer_controller::prelude::*;
//!
//! // Create controller components for a double-jumping character
//! let config = ControllerConfig::double_jump();
//! let controller = PlatformerController::new(config).unwrap();
//! let controls = KeyboardControls::default();
//!
//! // These can be spawned together with physics components
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod config;
pub mod debug;
pub mod error;
pub mod fall;
pub mod intent;
pub mod jump;
pub mod motion;
pub mod sensor;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::PlatformerPhysicsBackend;
    pub use crate::config::{ControllerConfig, PlatformerController};
    pub use crate::debug::PlatformerDebugPlugin;
    pub use crate::error::{ConfigError, ControllerError};
    pub use crate::intent::{FrameInput, KeyboardControls, PlatformerIntent};
    pub use crate::jump::{JumpKind, JumpState};
    pub use crate::sensor::GroundProbe;
    pub use crate::state::{Airborne, Grounded};
    pub use crate::{PlatformerControllerPlugin, PlatformerControllerSet};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::{Rapier2dBackend, Rapier2dCharacterBundle};
}

/// System sets for the controller, in execution order.
///
/// All sets except [`Motion`](Self::Motion) run chained in `Update`.
/// [`Motion`](Self::Motion) runs in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformerControllerSet {
    /// Body verification and backend bookkeeping (gravity sync).
    Setup,
    /// Device reads and input sampling.
    Input,
    /// Countdown decrement and buffer re-arming.
    Timers,
    /// Ground probe (installed by the backend).
    Sensors,
    /// Jump eligibility and launch.
    Jump,
    /// Fall and low-jump gravity.
    FallShaping,
    /// Marker component sync.
    StateSync,
    /// Horizontal integration on the fixed step.
    Motion,
}

/// Main plugin for the platformer controller.
///
/// This plugin is generic over a physics backend `B` which provides the actual
/// physics operations (velocity access, impulses, ground overlap test).
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier2dBackend`)
///
/// # Examples
///
/// With Rapier2D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use platformer_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(PlatformerControllerPlugin::<Rapier2dBackend>::default())
///     .run();
/// ```
pub struct PlatformerControllerPlugin<B: backend::PlatformerPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::PlatformerPhysicsBackend> Default for PlatformerControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::PlatformerPhysicsBackend> Plugin for PlatformerControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        use PlatformerControllerSet::*;

        app.register_type::<config::PlatformerController>();
        app.register_type::<intent::PlatformerIntent>();
        app.register_type::<intent::FrameInput>();
        app.register_type::<intent::KeyboardControls>();
        app.register_type::<sensor::GroundProbe>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();

        app.configure_sets(
            Update,
            (Setup, Input, Timers, Sensors, Jump, FallShaping, StateSync).chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(Update, systems::verify_physics_body::<B>.in_set(Setup));
        app.add_systems(
            Update,
            (
                (systems::read_keyboard_controls, systems::sample_frame_input)
                    .chain()
                    .in_set(Input),
                systems::advance_jump_timers.in_set(Timers),
                systems::resolve_jumps::<B>.in_set(Jump),
                systems::apply_fall_shaping::<B>.in_set(FallShaping),
                systems::sync_state_markers.in_set(StateSync),
            ),
        );

        app.add_systems(
            FixedUpdate,
            systems::integrate_horizontal_motion::<B>.in_set(Motion),
        );
    }
}
