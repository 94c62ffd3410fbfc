use serde::{Deserialize, Serialize};

/// One of the three fixed interval presets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Focus
    }
}

impl Mode {
    /// Interval length in whole seconds. Not user-editable.
    pub fn duration_secs(self) -> u32 {
        match self {
            Mode::Focus => 25 * 60,
            Mode::ShortBreak => 5 * 60,
            Mode::LongBreak => 15 * 60,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Focus => "Focus",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }
}

/// Result of applying one tick to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer was not running; nothing changed.
    Ignored,
    /// One second elapsed, time still remains.
    Running { remaining_secs: u32 },
    /// The countdown just hit zero. The state is no longer running.
    Expired,
}

/// Pure countdown state machine. Knows nothing about scheduling or audio;
/// the controller calls `tick()` once per second while running.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub mode: Mode,
    pub remaining_secs: u32,
    pub running: bool,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(Mode::Focus)
    }
}

impl TimerState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            remaining_secs: mode.duration_secs(),
            running: false,
        }
    }

    /// Begin counting down. No-op when already running or when the countdown
    /// has reached zero (a reset or mode switch is required first).
    /// Returns whether the state actually changed.
    pub fn start(&mut self) -> bool {
        if self.running || self.remaining_secs == 0 {
            return false;
        }
        self.running = true;
        true
    }

    /// Stop counting down, preserving the remaining time.
    /// Returns whether the state actually changed.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Advance the countdown by one second. Reaching zero forces the state
    /// out of running within the same call.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Ignored;
        }
        // Saturating: the fields are pub (and Deserialize), so a hand-built
        // running state with zero remaining must settle, not underflow.
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.running = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    /// Restore the full interval for the current mode and stop running.
    pub fn reset(&mut self) {
        self.remaining_secs = self.mode.duration_secs();
        self.running = false;
    }

    /// Change the interval preset. Always resets and stops running.
    pub fn switch_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_with_full_duration() {
        let state = TimerState::default();
        assert_eq!(state.mode, Mode::Focus);
        assert_eq!(state.remaining_secs, 1500);
        assert!(!state.running);
    }

    #[test]
    fn n_ticks_reach_zero_exactly() {
        let mut state = TimerState::new(Mode::ShortBreak);
        assert!(state.start());
        for _ in 0..299 {
            assert!(matches!(state.tick(), TickOutcome::Running { .. }));
        }
        assert_eq!(state.tick(), TickOutcome::Expired);
        assert_eq!(state.remaining_secs, 0);
        assert!(!state.running);
        // Further ticks are ignored; remaining never goes negative.
        assert_eq!(state.tick(), TickOutcome::Ignored);
        assert_eq!(state.remaining_secs, 0);
    }

    #[test]
    fn pause_then_start_resumes_exactly() {
        let mut state = TimerState::new(Mode::Focus);
        state.start();
        for _ in 0..10 {
            state.tick();
        }
        assert!(state.pause());
        assert_eq!(state.remaining_secs, 1490);
        assert!(state.start());
        assert_eq!(state.remaining_secs, 1490);
        assert!(state.running);
    }

    #[test]
    fn start_at_zero_is_a_no_op() {
        let mut state = TimerState::new(Mode::Focus);
        state.remaining_secs = 0;
        assert!(!state.start());
        assert!(!state.running);
    }

    #[test]
    fn start_while_running_is_a_no_op() {
        let mut state = TimerState::default();
        assert!(state.start());
        assert!(!state.start());
    }

    #[test]
    fn pause_while_idle_is_a_no_op() {
        let mut state = TimerState::default();
        assert!(!state.pause());
    }

    #[test]
    fn tick_on_hand_built_zero_state_settles_instead_of_underflowing() {
        // The fields are pub, so this state is constructible from outside.
        let mut state = TimerState {
            mode: Mode::Focus,
            remaining_secs: 0,
            running: true,
        };
        assert_eq!(state.tick(), TickOutcome::Expired);
        assert_eq!(state.remaining_secs, 0);
        assert!(!state.running);
    }

    #[test]
    fn switch_mode_then_reset_is_idempotent() {
        for mode in [Mode::Focus, Mode::ShortBreak, Mode::LongBreak] {
            let mut a = TimerState::default();
            a.start();
            a.tick();
            a.switch_mode(mode);

            let mut b = a.clone();
            b.reset();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn switch_mode_stops_and_reloads() {
        let mut state = TimerState::new(Mode::Focus);
        state.start();
        state.tick();
        state.switch_mode(Mode::LongBreak);
        assert_eq!(state.mode, Mode::LongBreak);
        assert_eq!(state.remaining_secs, 900);
        assert!(!state.running);
    }

    #[test]
    fn reset_after_expiry_allows_restart() {
        let mut state = TimerState::new(Mode::ShortBreak);
        state.start();
        while state.tick() != TickOutcome::Expired {}
        assert!(!state.start());
        state.reset();
        assert_eq!(state.remaining_secs, 300);
        assert!(state.start());
    }

    #[test]
    fn serializes_camel_case() {
        let state = TimerState::new(Mode::ShortBreak);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["mode"], "shortBreak");
        assert_eq!(json["remainingSecs"], 300);
        assert_eq!(json["running"], false);
    }
}
