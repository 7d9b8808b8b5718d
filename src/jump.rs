//! Jump state machine.
//!
//! Coyote time, jump buffering, the air-jump budget and the consumed latch are
//! all modelled as plain countdowns and counters rather than an explicit state
//! enum. A character is conceptually:
//! - **Grounded** while the coyote countdown is positive,
//! - **Airborne** once it reaches zero,
//! - **JustJumped** while the post-jump ground check cooldown is positive.
//!
//! The per-frame procedure is split into steps so the ECS systems can run the
//! ground sensor between them, but [`JumpState::update`] runs the whole frame
//! in one call for hosts that drive the controller directly.

use bevy::prelude::*;

use crate::config::ControllerConfig;
use crate::intent::FrameInput;
use crate::sensor;

/// Time (seconds) after a ground jump during which ground checks are skipped.
///
/// The body is still touching the ground on the step the impulse is issued;
/// without the cooldown the next check would re-arm coyote time and clear the
/// consumed latch.
pub const POST_JUMP_GROUND_CHECK_COOLDOWN: f32 = 0.15;

/// Countdowns stop decreasing here. Only their sign matters.
const TIMER_FLOOR: f32 = -60.0;

/// The kind of jump that fired.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JumpKind {
    /// Jump from the ground, or within coyote time after leaving it.
    Ground,
    /// Jump while truly airborne, paid from the air-jump budget.
    Air,
}

impl JumpKind {
    /// Upward launch speed for this kind of jump.
    pub fn launch_speed(self, config: &ControllerConfig) -> f32 {
        match self {
            JumpKind::Ground => config.jump_force,
            JumpKind::Air => config.jump_force * config.air_jump_multiplier,
        }
    }

    /// Upward impulse (per unit mass) for this kind of jump.
    pub fn impulse(self, config: &ControllerConfig) -> Vec2 {
        Vec2::Y * self.launch_speed(config)
    }
}

/// Frame-local countdowns, in seconds.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpTimers {
    /// Coyote time remaining.
    pub grounded: f32,
    /// Jump buffer remaining.
    pub jump_pressed: f32,
    /// Remaining time during which the ground sensor is skipped.
    pub ground_check_cooldown: f32,
}

impl JumpTimers {
    /// Decrement all countdowns by the elapsed frame time.
    pub fn tick(&mut self, dt: f32) {
        self.grounded = (self.grounded - dt).max(TIMER_FLOOR);
        self.jump_pressed = (self.jump_pressed - dt).max(TIMER_FLOOR);
        self.ground_check_cooldown = (self.ground_check_cooldown - dt).max(TIMER_FLOOR);
    }

    /// Whether the ground sensor must be skipped this frame.
    #[inline]
    pub fn ground_check_blocked(&self) -> bool {
        self.ground_check_cooldown > 0.0
    }

    /// Whether a recent ground contact still counts (coyote window).
    #[inline]
    pub fn in_coyote_window(&self) -> bool {
        self.grounded > 0.0
    }

    /// Whether a jump press is buffered.
    #[inline]
    pub fn is_buffered(&self) -> bool {
        self.jump_pressed > 0.0
    }
}

/// Jumps left before the next landing.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpBudget {
    remaining: u32,
}

impl JumpBudget {
    /// A full budget of `max_jumps`.
    pub fn new(max_jumps: u32) -> Self {
        Self {
            remaining: max_jumps,
        }
    }

    /// Jumps left.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether at least one jump is left.
    #[inline]
    pub fn has_jumps(&self) -> bool {
        self.remaining > 0
    }

    fn refill(&mut self, max_jumps: u32) {
        self.remaining = max_jumps;
    }

    fn spend_air_jump(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    fn after_ground_jump(&mut self, max_jumps: u32) {
        self.remaining = max_jumps.saturating_sub(1);
    }

    pub(crate) fn clamp_to(&mut self, max_jumps: u32) {
        self.remaining = self.remaining.min(max_jumps);
    }
}

/// Complete jump state of one character.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct JumpState {
    /// Coyote, buffer and cooldown countdowns.
    pub timers: JumpTimers,
    /// Remaining jumps before landing.
    pub budget: JumpBudget,
    /// Set when a ground jump fires, cleared on landing.
    consumed: bool,
}

impl JumpState {
    /// Fresh state: airborne, nothing buffered, full budget.
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            timers: JumpTimers::default(),
            budget: JumpBudget::new(config.max_jumps),
            consumed: false,
        }
    }

    /// Whether a jump has fired since the last landing.
    #[inline]
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Steps 1 and 2: decrement the countdowns, then re-arm the buffer on a
    /// press edge regardless of ground state.
    pub fn advance(&mut self, dt: f32, jump_pressed: bool, config: &ControllerConfig) {
        self.timers.tick(dt);
        if jump_pressed {
            self.timers.jump_pressed = config.jump_buffer_time;
        }
    }

    /// Step 3 on a positive ground check: re-arm coyote time, clear the latch
    /// and refill the budget.
    pub fn land(&mut self, config: &ControllerConfig) {
        self.timers.grounded = config.coyote_time;
        self.consumed = false;
        self.budget.refill(config.max_jumps);
    }

    /// Step 4: which jump, if any, is allowed right now.
    ///
    /// A ground jump needs the coyote window; an air jump needs it closed, so
    /// a coyote-time jump never spends the air budget.
    pub fn eligible(&self, config: &ControllerConfig) -> Option<JumpKind> {
        if config.max_jumps == 0 || !self.timers.is_buffered() {
            return None;
        }

        if self.timers.in_coyote_window() && !self.consumed {
            Some(JumpKind::Ground)
        } else if !self.timers.in_coyote_window() && self.budget.has_jumps() {
            Some(JumpKind::Air)
        } else {
            None
        }
    }

    /// Step 5: commit a jump of the given kind. The caller applies the velocity.
    pub fn fire(&mut self, kind: JumpKind, config: &ControllerConfig) {
        self.consumed = true;
        self.timers.grounded = 0.0;
        self.timers.jump_pressed = 0.0;

        match kind {
            JumpKind::Ground => {
                self.timers.ground_check_cooldown = POST_JUMP_GROUND_CHECK_COOLDOWN;
                self.budget.after_ground_jump(config.max_jumps);
            }
            JumpKind::Air => self.budget.spend_air_jump(),
        }
    }

    /// Steps 4 and 5 together.
    pub fn try_jump(&mut self, config: &ControllerConfig) -> Option<JumpKind> {
        let kind = self.eligible(config)?;
        self.fire(kind, config);
        Some(kind)
    }

    /// Run one whole frame.
    ///
    /// `overlap` is the physics overlap test at the probe; it is not called
    /// while the post-jump cooldown is active. Returns the jump that fired.
    pub fn update(
        &mut self,
        dt: f32,
        input: &FrameInput,
        config: &ControllerConfig,
        overlap: impl FnOnce() -> bool,
    ) -> Option<JumpKind> {
        self.advance(dt, input.jump_pressed, config);

        if sensor::sense_ground(&self.timers, overlap) {
            self.land(config);
        }

        self.try_jump(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const DT: f32 = 1.0 / 60.0;

    fn press() -> FrameInput {
        FrameInput {
            axis: 0.0,
            jump_pressed: true,
            jump_held: true,
        }
    }

    fn idle() -> FrameInput {
        FrameInput::NEUTRAL
    }

    /// Run `frames` frames of the given input and ground contact, collecting fired jumps.
    fn run(
        state: &mut JumpState,
        config: &ControllerConfig,
        frames: usize,
        input: FrameInput,
        on_ground: bool,
    ) -> Vec<JumpKind> {
        (0..frames)
            .filter_map(|_| state.update(DT, &input, config, || on_ground))
            .collect()
    }

    #[test]
    fn press_on_ground_fires_exactly_one_ground_jump() {
        let config = ControllerConfig::default();
        let mut state = JumpState::new(&config);

        assert_eq!(state.update(DT, &press(), &config, || true), Some(JumpKind::Ground));
        assert_eq!(state.timers.jump_pressed, 0.0);
        assert!(state.is_consumed());

        // Body still overlaps the ground while the impulse takes effect.
        let later = run(&mut state, &config, 30, idle(), true);
        assert!(later.is_empty(), "no second jump from the same press: {later:?}");
    }

    #[test]
    fn ground_check_skipped_during_post_jump_cooldown() {
        let config = ControllerConfig::default();
        let mut state = JumpState::new(&config);
        state.update(DT, &press(), &config, || true);

        let mut queried = false;
        state.update(DT, &idle(), &config, || {
            queried = true;
            true
        });

        assert!(!queried);
        assert!(!state.timers.in_coyote_window());
        assert!(state.is_consumed());
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn landing_resets_budget_and_latch(#[case] max_jumps: u32) {
        let config = ControllerConfig::default().with_max_jumps(max_jumps);
        let mut state = JumpState::new(&config);
        state.fire(JumpKind::Ground, &config);
        state.fire(JumpKind::Air, &config);

        state.land(&config);

        assert_eq!(state.budget.remaining(), max_jumps);
        assert!(!state.is_consumed());
        assert_eq!(state.timers.grounded, config.coyote_time);
    }

    #[test]
    fn double_jump_spends_budget_once_per_press() {
        let config = ControllerConfig::default().with_max_jumps(2);
        let mut state = JumpState::new(&config);

        assert_eq!(state.update(DT, &press(), &config, || true), Some(JumpKind::Ground));
        assert_eq!(state.budget.remaining(), 1);

        assert!(run(&mut state, &config, 20, idle(), false).is_empty());

        assert_eq!(state.update(DT, &press(), &config, || false), Some(JumpKind::Air));
        assert_eq!(state.budget.remaining(), 0);

        assert!(run(&mut state, &config, 10, idle(), false).is_empty());
        assert_eq!(state.update(DT, &press(), &config, || false), None);
        assert_eq!(state.budget.remaining(), 0);
    }

    #[test]
    fn air_jump_uses_multiplier() {
        let config = ControllerConfig::default()
            .with_max_jumps(2)
            .with_air_jump_multiplier(0.5);

        assert_eq!(JumpKind::Ground.launch_speed(&config), config.jump_force);
        assert_eq!(JumpKind::Air.launch_speed(&config), config.jump_force * 0.5);
        assert_eq!(JumpKind::Air.impulse(&config), Vec2::new(0.0, config.jump_force * 0.5));
    }

    #[test]
    fn buffered_press_fires_on_landing() {
        let config = ControllerConfig::default();
        let mut state = JumpState::new(&config);

        // Spend the only jump, then fall for a while.
        state.update(DT, &press(), &config, || true);
        assert!(run(&mut state, &config, 20, idle(), false).is_empty());

        // Press three frames before touching down.
        assert_eq!(state.update(DT, &press(), &config, || false), None);
        assert!(run(&mut state, &config, 2, idle(), false).is_empty());

        assert_eq!(state.update(DT, &idle(), &config, || true), Some(JumpKind::Ground));
    }

    #[test]
    fn buffered_press_expires() {
        let config = ControllerConfig::default();
        let mut state = JumpState::new(&config);

        state.update(DT, &press(), &config, || true);
        run(&mut state, &config, 20, idle(), false);

        state.update(DT, &press(), &config, || false);
        assert!(run(&mut state, &config, 8, idle(), false).is_empty());

        assert_eq!(state.update(DT, &idle(), &config, || true), None);
    }

    #[test]
    fn coyote_press_is_a_ground_jump() {
        let config = ControllerConfig::default().with_max_jumps(2);
        let mut state = JumpState::new(&config);

        run(&mut state, &config, 5, idle(), true);
        // Walk off the ledge.
        run(&mut state, &config, 2, idle(), false);

        assert_eq!(state.update(DT, &press(), &config, || false), Some(JumpKind::Ground));
        // The air jump is still available.
        assert_eq!(state.budget.remaining(), 1);
    }

    #[test]
    fn press_after_coyote_window_is_an_air_jump() {
        let config = ControllerConfig::default().with_max_jumps(2);
        let mut state = JumpState::new(&config);

        run(&mut state, &config, 5, idle(), true);
        run(&mut state, &config, 8, idle(), false);

        assert_eq!(state.update(DT, &press(), &config, || false), Some(JumpKind::Air));
        assert_eq!(state.budget.remaining(), 1);
    }

    #[test]
    fn ground_jump_takes_precedence_within_coyote_window() {
        let config = ControllerConfig::default().with_max_jumps(3);
        let mut state = JumpState::new(&config);
        state.land(&config);
        state.advance(DT, true, &config);

        assert!(state.budget.has_jumps());
        assert_eq!(state.eligible(&config), Some(JumpKind::Ground));
    }

    #[test]
    fn zero_max_jumps_never_jumps() {
        let config = ControllerConfig {
            max_jumps: 0,
            ..default()
        };
        let mut state = JumpState::new(&config);

        assert_eq!(state.update(DT, &press(), &config, || true), None);
        assert_eq!(state.update(DT, &press(), &config, || false), None);
        assert_eq!(state.budget.remaining(), 0);
    }

    #[test]
    fn budget_never_exceeds_max_or_underflows() {
        let config = ControllerConfig::default().with_max_jumps(2);
        let mut state = JumpState::new(&config);

        for frame in 0..600 {
            let input = if frame % 7 == 0 { press() } else { idle() };
            state.update(DT, &input, &config, || frame % 90 < 10);
            assert!(state.budget.remaining() <= config.max_jumps);
        }
    }

    #[test]
    fn timers_are_floored() {
        let mut timers = JumpTimers::default();
        for _ in 0..10_000 {
            timers.tick(1.0);
        }
        assert_eq!(timers.grounded, TIMER_FLOOR);
        assert!(!timers.in_coyote_window());
        assert!(!timers.is_buffered());
        assert!(!timers.ground_check_blocked());
    }
}
