//! Debug overlay for the ground probe.
//!
//! Draws each controller's ground check circle with gizmos: green while the
//! last check found ground, red otherwise. Needs Bevy's gizmo plugin, which
//! `DefaultPlugins` includes.

use bevy::prelude::*;

use crate::config::PlatformerController;
use crate::sensor::GroundProbe;
use crate::PlatformerControllerSet;

/// Probe color while grounded.
pub const GROUNDED_COLOR: Color = Color::srgb(0.2, 0.85, 0.3);
/// Probe color while airborne.
pub const AIRBORNE_COLOR: Color = Color::srgb(0.9, 0.2, 0.2);

/// Runtime state of the debug overlay.
#[derive(Resource, Debug, Clone)]
pub struct PlatformerDebugSettings {
    /// Whether probes are drawn.
    pub enabled: bool,
    /// Key that toggles drawing.
    pub toggle_key: KeyCode,
}

impl Default for PlatformerDebugSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            toggle_key: KeyCode::F3,
        }
    }
}

/// Plugin that draws ground probes.
///
/// Add it next to [`PlatformerControllerPlugin`](crate::PlatformerControllerPlugin).
#[derive(Default)]
pub struct PlatformerDebugPlugin {
    /// Start with the overlay hidden.
    pub start_hidden: bool,
}

impl Plugin for PlatformerDebugPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(PlatformerDebugSettings {
            enabled: !self.start_hidden,
            ..default()
        });
        app.add_systems(
            Update,
            (toggle_debug_overlay, draw_ground_probes)
                .chain()
                .after(PlatformerControllerSet::StateSync),
        );
    }
}

/// Color of a probe given the last ground check.
pub fn probe_color(grounded: bool) -> Color {
    if grounded {
        GROUNDED_COLOR
    } else {
        AIRBORNE_COLOR
    }
}

fn toggle_debug_overlay(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    mut settings: ResMut<PlatformerDebugSettings>,
) {
    let Some(keyboard) = keyboard else {
        return;
    };
    if keyboard.just_pressed(settings.toggle_key) {
        settings.enabled = !settings.enabled;
        info!(
            "Ground probe overlay {}",
            if settings.enabled { "shown" } else { "hidden" }
        );
    }
}

fn draw_ground_probes(
    settings: Res<PlatformerDebugSettings>,
    mut gizmos: Gizmos,
    q_controllers: Query<(&GlobalTransform, &GroundProbe, &PlatformerController)>,
) {
    if !settings.enabled {
        return;
    }

    for (transform, probe, controller) in &q_controllers {
        let point = probe.world_point(transform.translation().xy());
        gizmos.circle_2d(
            Isometry2d::from_translation(point),
            controller.config().ground_check_radius,
            probe_color(controller.is_grounded()),
        );
    }
}
