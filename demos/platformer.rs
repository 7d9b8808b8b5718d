//! Platformer Example
//!
//! A playable level with a floor, floating platforms and a tall ledge for
//! trying out coyote time, jump buffering and double jumps.
//!
//! ## Controls
//! - **A/D** or **Left/Right**: Move horizontally
//! - **Space**, **W** or **Up**: Jump (hold for a higher jump, press again in the air to double jump)
//! - **F3**: Toggle the ground probe overlay
//!
//! Tuning is read from `demos/controller.toml` when it exists. The camera
//! follows the player with a dead zone.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use platformer_controller::prelude::*;

// ==================== Constants ====================

const PX_PER_M: f32 = 50.0; // Pixels per meter for Rapier

const CONFIG_PATH: &str = "demos/controller.toml";

const PLAYER_HALF_SIZE: Vec2 = Vec2::new(20.0, 30.0);

const CAMERA_DEAD_ZONE: Vec2 = Vec2::new(3.0 * PX_PER_M, 2.0 * PX_PER_M);
const CAMERA_SMOOTHING: f32 = 0.125;

/// Marks the player character for the camera.
#[derive(Component)]
struct Player;

// ==================== Main ====================

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Platformer - Controller Example".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(
            PX_PER_M,
        ))
        // Character controller
        .add_plugins(PlatformerControllerPlugin::<Rapier2dBackend>::default())
        .add_plugins(PlatformerDebugPlugin::default())
        // Systems
        .add_systems(Startup, setup)
        .add_systems(PostUpdate, camera_follow.before(bevy::transform::TransformSystem::TransformPropagate))
        .run();
}

/// Load the tuning file, falling back to the built-in double jump preset.
fn load_config() -> ControllerConfig {
    match ControllerConfig::from_toml_file(CONFIG_PATH) {
        Ok(config) => config,
        Err(err) => {
            warn!("Using default controller config: {err}");
            ControllerConfig::double_jump()
        }
    }
}

// ==================== Setup ====================

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);

    spawn_level(&mut commands);
    spawn_player(&mut commands);

    commands.spawn((
        Text::new("A/D: Move | Space: Jump (double jump in the air) | F3: Probe overlay"),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

fn spawn_level(commands: &mut Commands) {
    let ground = Color::srgb(0.3, 0.3, 0.3);
    let platform = Color::srgb(0.4, 0.5, 0.3);

    // Floor
    spawn_platform(commands, Vec2::new(0.0, -300.0), Vec2::new(1500.0, 20.0), ground);

    // Stepping platforms
    spawn_platform(commands, Vec2::new(-350.0, -180.0), Vec2::new(100.0, 10.0), platform);
    spawn_platform(commands, Vec2::new(-100.0, -80.0), Vec2::new(80.0, 10.0), platform);
    spawn_platform(commands, Vec2::new(150.0, 20.0), Vec2::new(60.0, 10.0), platform);

    // Tall ledge: walk off it to feel coyote time
    spawn_platform(commands, Vec2::new(550.0, -130.0), Vec2::new(150.0, 150.0), ground);

    // Out of single jump range; needs the double jump
    spawn_platform(commands, Vec2::new(950.0, 120.0), Vec2::new(120.0, 10.0), platform);
}

fn spawn_platform(commands: &mut Commands, position: Vec2, half_size: Vec2, color: Color) {
    commands.spawn((
        Sprite::from_color(color, half_size * 2.0),
        Transform::from_translation(position.extend(0.0)),
        RigidBody::Fixed,
        Collider::cuboid(half_size.x, half_size.y),
    ));
}

fn spawn_player(commands: &mut Commands) {
    let controller = match PlatformerController::new(load_config().scaled(PX_PER_M)) {
        Ok(controller) => controller,
        Err(err) => {
            error!("Invalid controller config: {err}");
            return;
        }
    };

    commands.spawn((
        Player,
        Sprite::from_color(Color::srgb(0.2, 0.6, 0.9), PLAYER_HALF_SIZE * 2.0),
        Transform::from_xyz(-500.0, -200.0, 1.0),
        controller,
        GroundProbe::default().scaled(PX_PER_M),
        KeyboardControls::default(),
        Rapier2dCharacterBundle::new(),
        Collider::cuboid(PLAYER_HALF_SIZE.x, PLAYER_HALF_SIZE.y),
    ));
}

// ==================== Camera ====================

/// Follow the player once it leaves the dead zone around the camera center.
fn camera_follow(
    q_player: Query<&Transform, (With<Player>, Without<Camera2d>)>,
    mut q_camera: Query<&mut Transform, With<Camera2d>>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    let Ok(mut camera) = q_camera.single_mut() else {
        return;
    };

    let current = camera.translation.xy();
    let offset = player.translation.xy() - current;
    let half_zone = CAMERA_DEAD_ZONE / 2.0;

    // Only the part of the offset outside the dead zone moves the camera
    let excess = offset - offset.clamp(-half_zone, half_zone);
    let target = current + excess;

    let smoothed = current.lerp(target, CAMERA_SMOOTHING);
    camera.translation.x = smoothed.x;
    camera.translation.y = smoothed.y;
}
