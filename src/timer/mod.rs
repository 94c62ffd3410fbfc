pub mod controller;
pub mod state;

pub use controller::{TimerController, TimerSnapshot};
pub use state::{Mode, TickOutcome, TimerState};
