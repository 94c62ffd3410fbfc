use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{error, info};
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time,
};

use crate::audio::AudioEngineHandle;
use crate::events::TimerEvent;
use crate::tasks::SharedTaskRegistry;

use super::{Mode, TickOutcome, TimerState};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Point-in-time view for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub mode_label: &'static str,
    pub duration_secs: u32,
    pub sound_on: bool,
}

/// Drives the countdown state machine on a once-per-second cadence and owns
/// the side effects of expiry: alarm, noise shutdown, session crediting.
///
/// Exactly one ticker task exists while the timer runs; every transition away
/// from running aborts it. The cadence is wall-clock-approximate -- under
/// scheduler suspension ticks are delivered late, which is accepted.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    tasks: SharedTaskRegistry,
    audio: AudioEngineHandle,
    events: broadcast::Sender<TimerEvent>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    sound_on: Arc<AtomicBool>,
}

impl TimerController {
    pub fn new(audio: AudioEngineHandle, tasks: SharedTaskRegistry) -> Self {
        Self::with_tick_interval(audio, tasks, Duration::from_secs(1))
    }

    /// Injectable cadence; tests shrink it or drive it with paused time.
    pub fn with_tick_interval(
        audio: AudioEngineHandle,
        tasks: SharedTaskRegistry,
        tick_interval: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(TimerState::default())),
            tasks,
            audio,
            events,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval,
            sound_on: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        let state = self.state.lock().await.clone();
        TimerSnapshot {
            mode_label: state.mode.label(),
            duration_secs: state.mode.duration_secs(),
            sound_on: self.sound_on.load(Ordering::SeqCst),
            state,
        }
    }

    pub fn is_sound_on(&self) -> bool {
        self.sound_on.load(Ordering::SeqCst)
    }

    /// Begin the countdown. A start at zero remaining, or while already
    /// running, changes nothing.
    pub async fn start(&self) -> TimerSnapshot {
        let started = {
            let mut state = self.state.lock().await;
            if state.start() {
                Some((state.mode, state.remaining_secs))
            } else {
                None
            }
        };
        if let Some((mode, remaining_secs)) = started {
            info!("timer started: {} ({remaining_secs}s)", mode.label());
            self.spawn_ticker().await;
            let _ = self.events.send(TimerEvent::Started {
                mode,
                remaining_secs,
                at: Utc::now(),
            });
        }
        self.snapshot().await
    }

    /// Halt the countdown, preserving remaining time.
    pub async fn pause(&self) -> TimerSnapshot {
        let paused = {
            let mut state = self.state.lock().await;
            if state.pause() {
                Some(state.remaining_secs)
            } else {
                None
            }
        };
        if let Some(remaining_secs) = paused {
            self.cancel_ticker().await;
            info!("timer paused with {remaining_secs}s remaining");
            let _ = self.events.send(TimerEvent::Paused {
                remaining_secs,
                at: Utc::now(),
            });
        }
        self.snapshot().await
    }

    /// Reload the full interval for the current mode. Also silences the
    /// noise bed: ambient sound is tied to an active session.
    pub async fn reset(&self) -> TimerSnapshot {
        let mode = {
            let mut state = self.state.lock().await;
            state.reset();
            state.mode
        };
        self.cancel_ticker().await;
        self.mute();
        let _ = self.events.send(TimerEvent::Reset {
            mode,
            at: Utc::now(),
        });
        self.snapshot().await
    }

    /// Change interval preset; always resets, stops, and silences.
    pub async fn switch_mode(&self, mode: Mode) -> TimerSnapshot {
        {
            let mut state = self.state.lock().await;
            state.switch_mode(mode);
        }
        self.cancel_ticker().await;
        self.mute();
        info!("mode switched to {}", mode.label());
        let _ = self.events.send(TimerEvent::ModeSwitched {
            mode,
            at: Utc::now(),
        });
        self.snapshot().await
    }

    /// Flip the ambient noise bed on or off. Returns the new flag. Audio
    /// device failures are logged on the engine thread; the flag still
    /// tracks the user's intent.
    pub fn toggle_sound(&self) -> bool {
        if self.sound_on.load(Ordering::SeqCst) {
            self.mute();
            false
        } else {
            if let Err(e) = self.audio.start_noise() {
                error!("failed to start noise: {e}");
                return false;
            }
            self.sound_on.store(true, Ordering::SeqCst);
            true
        }
    }

    fn mute(&self) {
        self.sound_on.store(false, Ordering::SeqCst);
        if let Err(e) = self.audio.stop_noise() {
            error!("failed to stop noise: {e}");
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let tasks = self.tasks.clone();
        let audio = self.audio.clone();
        let events = self.events.clone();
        let sound_on = self.sound_on.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            // The first interval tick resolves immediately; swallow it so the
            // countdown only moves after a full period.
            interval.tick().await;
            loop {
                interval.tick().await;

                // Capture the mode under the same lock as the tick so a
                // concurrent switch_mode cannot relabel an expiry.
                let (outcome, mode) = {
                    let mut state = state.lock().await;
                    let outcome = state.tick();
                    (outcome, state.mode)
                };
                match outcome {
                    TickOutcome::Running { .. } => {}
                    TickOutcome::Ignored => break,
                    TickOutcome::Expired => {
                        info!("{} interval expired", mode.label());

                        // Silence the bed before sounding the alarm.
                        sound_on.store(false, Ordering::SeqCst);
                        if let Err(e) = audio.stop_noise() {
                            error!("failed to stop noise on expiry: {e}");
                        }
                        if let Err(e) = audio.play_alarm() {
                            error!("failed to play alarm: {e}");
                        }

                        // A completed focus interval credits the active task.
                        let credited_task_id = if mode == Mode::Focus {
                            let mut tasks = tasks.lock().await;
                            let active = tasks.active_task_id().map(str::to_owned);
                            match active {
                                Some(id) if tasks.increment_sessions(&id) => Some(id),
                                _ => None,
                            }
                        } else {
                            None
                        };

                        let _ = events.send(TimerEvent::Completed {
                            mode,
                            credited_task_id,
                            at: Utc::now(),
                        });
                        break;
                    }
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}
