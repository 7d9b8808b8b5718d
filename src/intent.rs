//! Input sampling.
//!
//! [`PlatformerIntent`] is what the host writes: the current axis and whether
//! the jump button is held. Once per frame it is sampled into a
//! [`FrameInput`], the read-only facts the rest of the controller consumes.
//!
//! Any source can drive the intent (keyboard, gamepad, AI, replay). For the
//! common case, [`KeyboardControls`] reads the keyboard and first gamepad.

use bevy::prelude::*;

/// Axis values below this magnitude count as no input.
pub const AXIS_DEAD_ZONE: f32 = 0.001;

/// Raw movement input written by the host.
///
/// # Example
///
/// ```rust
/// use platformer_controller::prelude::*;
///
/// let mut intent = PlatformerIntent::default();
/// intent.set_axis(1.0);
/// intent.set_jump_held(true);
///
/// let input = intent.sample();
/// assert_eq!(input.axis, 1.0);
/// assert!(input.jump_pressed);
///
/// // The press edge is reported once.
/// assert!(!intent.sample().jump_pressed);
/// assert!(intent.sample().jump_held);
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct PlatformerIntent {
    /// Horizontal axis (-1.0 = left, 1.0 = right).
    pub axis: f32,
    /// Whether the jump button is currently held.
    pub jump_held: bool,
    /// A released-to-pressed transition happened since the last sample.
    pending_press: bool,
}

impl PlatformerIntent {
    /// Create a neutral intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal axis, clamped to [-1, 1]. NaN is treated as neutral.
    pub fn set_axis(&mut self, axis: f32) {
        self.axis = if axis.is_nan() { 0.0 } else { axis.clamp(-1.0, 1.0) };
    }

    /// Set the jump button state. Call every frame with the current state.
    ///
    /// A press edge is latched until the next sample, so a press and release
    /// between two frames still produces one jump press.
    pub fn set_jump_held(&mut self, held: bool) {
        if held && !self.jump_held {
            self.pending_press = true;
        }
        self.jump_held = held;
    }

    /// Register a jump press without changing the held state (AI, scripts).
    pub fn press_jump(&mut self) {
        self.pending_press = true;
    }

    /// Clear all input.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether there is horizontal input.
    pub fn is_moving(&self) -> bool {
        self.axis.abs() > AXIS_DEAD_ZONE
    }

    /// Produce this frame's input facts and consume the press edge.
    pub fn sample(&mut self) -> FrameInput {
        FrameInput {
            axis: self.axis,
            jump_pressed: std::mem::take(&mut self.pending_press),
            jump_held: self.jump_held,
        }
    }
}

/// Input facts for the current frame.
///
/// Written once per frame by the sampling system, read by the jump state
/// machine, the fall shaper and the horizontal integrator.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct FrameInput {
    /// Horizontal axis in [-1, 1].
    pub axis: f32,
    /// True only on the frame the jump button went from released to pressed.
    pub jump_pressed: bool,
    /// True while the jump button is held.
    pub jump_held: bool,
}

impl FrameInput {
    /// No input at all.
    pub const NEUTRAL: Self = Self {
        axis: 0.0,
        jump_pressed: false,
        jump_held: false,
    };
}

/// Binds keyboard keys (and the first connected gamepad) to a character.
///
/// Characters without this component are driven entirely through
/// [`PlatformerIntent`]. Missing input devices leave the intent neutral.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct KeyboardControls {
    /// Keys that push the axis left.
    pub left: Vec<KeyCode>,
    /// Keys that push the axis right.
    pub right: Vec<KeyCode>,
    /// Keys that jump.
    pub jump: Vec<KeyCode>,
    /// Also read the left stick and South button of the first gamepad.
    pub use_gamepad: bool,
}

impl Default for KeyboardControls {
    fn default() -> Self {
        Self {
            left: vec![KeyCode::KeyA, KeyCode::ArrowLeft],
            right: vec![KeyCode::KeyD, KeyCode::ArrowRight],
            jump: vec![KeyCode::Space, KeyCode::KeyW, KeyCode::ArrowUp],
            use_gamepad: true,
        }
    }
}

impl KeyboardControls {
    /// Axis value from the currently pressed keys (-1, 0 or 1).
    pub fn axis(&self, keyboard: &ButtonInput<KeyCode>) -> f32 {
        let mut axis = 0.0;
        if keyboard.any_pressed(self.left.iter().copied()) {
            axis -= 1.0;
        }
        if keyboard.any_pressed(self.right.iter().copied()) {
            axis += 1.0;
        }
        axis
    }

    /// Whether any jump key is held.
    pub fn jump_held(&self, keyboard: &ButtonInput<KeyCode>) -> bool {
        keyboard.any_pressed(self.jump.iter().copied())
    }

    /// Whether any jump key went down since the last input update, even if
    /// it was released again before this frame.
    pub fn jump_just_pressed(&self, keyboard: &ButtonInput<KeyCode>) -> bool {
        keyboard.any_just_pressed(self.jump.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_axis_clamps() {
        let mut intent = PlatformerIntent::new();
        intent.set_axis(0.5);
        assert_eq!(intent.axis, 0.5);

        intent.set_axis(5.0);
        assert_eq!(intent.axis, 1.0);

        intent.set_axis(-5.0);
        assert_eq!(intent.axis, -1.0);

        intent.set_axis(f32::NAN);
        assert_eq!(intent.axis, 0.0);
    }

    #[test]
    fn is_moving_uses_dead_zone() {
        let mut intent = PlatformerIntent::new();
        assert!(!intent.is_moving());

        intent.set_axis(0.0001);
        assert!(!intent.is_moving());

        intent.set_axis(-0.5);
        assert!(intent.is_moving());
    }

    #[test]
    fn press_edge_reported_once() {
        let mut intent = PlatformerIntent::new();
        intent.set_jump_held(true);

        let first = intent.sample();
        assert!(first.jump_pressed);
        assert!(first.jump_held);

        intent.set_jump_held(true);
        let second = intent.sample();
        assert!(!second.jump_pressed);
        assert!(second.jump_held);
    }

    #[test]
    fn tap_between_frames_still_presses() {
        let mut intent = PlatformerIntent::new();
        intent.set_jump_held(true);
        intent.set_jump_held(false);

        let input = intent.sample();
        assert!(input.jump_pressed);
        assert!(!input.jump_held);
    }

    #[test]
    fn release_and_repress_creates_new_edge() {
        let mut intent = PlatformerIntent::new();
        intent.set_jump_held(true);
        intent.sample();

        intent.set_jump_held(false);
        assert!(!intent.sample().jump_pressed);

        intent.set_jump_held(true);
        assert!(intent.sample().jump_pressed);
    }

    #[test]
    fn press_jump_does_not_hold() {
        let mut intent = PlatformerIntent::new();
        intent.press_jump();

        let input = intent.sample();
        assert!(input.jump_pressed);
        assert!(!input.jump_held);
    }

    #[test]
    fn clear_drops_pending_press() {
        let mut intent = PlatformerIntent::new();
        intent.set_axis(1.0);
        intent.set_jump_held(true);
        intent.clear();

        assert_eq!(intent.sample(), FrameInput::NEUTRAL);
    }

    #[test]
    fn keyboard_controls_axis() {
        let controls = KeyboardControls::default();
        let mut keyboard = ButtonInput::<KeyCode>::default();
        assert_eq!(controls.axis(&keyboard), 0.0);

        keyboard.press(KeyCode::KeyA);
        assert_eq!(controls.axis(&keyboard), -1.0);

        keyboard.press(KeyCode::ArrowRight);
        assert_eq!(controls.axis(&keyboard), 0.0);

        keyboard.release(KeyCode::KeyA);
        assert_eq!(controls.axis(&keyboard), 1.0);
    }

    #[test]
    fn keyboard_controls_jump() {
        let controls = KeyboardControls::default();
        let mut keyboard = ButtonInput::<KeyCode>::default();
        assert!(!controls.jump_held(&keyboard));

        keyboard.press(KeyCode::Space);
        assert!(controls.jump_held(&keyboard));
    }

    #[test]
    fn keyboard_tap_is_just_pressed_but_not_held() {
        let controls = KeyboardControls::default();
        let mut keyboard = ButtonInput::<KeyCode>::default();

        keyboard.press(KeyCode::KeyW);
        keyboard.release(KeyCode::KeyW);

        assert!(!controls.jump_held(&keyboard));
        assert!(controls.jump_just_pressed(&keyboard));

        keyboard.clear();
        assert!(!controls.jump_just_pressed(&keyboard));
    }
}
