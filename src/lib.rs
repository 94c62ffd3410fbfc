//! Core of a Pomodoro focus timer: a countdown state machine with three
//! fixed interval presets, a task list with per-task completed-session
//! counters, and procedurally synthesized ambient audio (looped brown noise
//! plus an end-of-interval alarm chirp).
//!
//! The presentation layer is a thin shell over [`AppState`]: it dispatches
//! user intents into the timer controller and task registry and subscribes
//! to [`TimerEvent`]s to repaint. Nothing here persists across runs.

pub mod audio;
pub mod events;
pub mod tasks;
pub mod timer;

pub use audio::AudioEngineHandle;
pub use events::TimerEvent;
pub use tasks::{SharedTaskRegistry, Task, TaskRegistry};
pub use timer::{Mode, TickOutcome, TimerController, TimerSnapshot, TimerState};

/// Everything a presentation layer holds: the audio engine, the shared task
/// registry, and the timer controller wired to both.
pub struct AppState {
    pub audio: AudioEngineHandle,
    pub tasks: SharedTaskRegistry,
    pub timer: TimerController,
}

impl AppState {
    pub fn new() -> Self {
        let audio = AudioEngineHandle::new();
        let tasks = tasks::shared_registry();
        let timer = TimerController::new(audio.clone(), tasks.clone());
        Self {
            audio,
            tasks,
            timer,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
