//! State marker components.
//!
//! These components mirror the result of the last ground check so other
//! systems (animation, sound) can filter on them. They are added and removed
//! by the controller systems.

use bevy::prelude::*;

/// Marker component indicating the last ground check found ground.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use platformer_controller::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`]. Also present during the short
/// window after a ground jump in which ground checks are skipped.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;
