pub mod alarm;
pub mod brown_noise;

use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Result};
use log::error;
use rodio::{OutputStream, OutputStreamHandle, Sink};

use alarm::AlarmChirp;
use brown_noise::BrownNoiseLoop;

/// Output sample rate shared by every synthesized source.
pub const SAMPLE_RATE: u32 = 44_100;
/// Fixed listening level for the ambient noise loop.
const NOISE_VOLUME: f32 = 0.05;

enum AudioCommand {
    StartNoise,
    StopNoise,
    PlayAlarm,
}

/// Whether a fire-and-forget alarm started before `alarm_until` is still
/// sounding at `now`. Dropping the output stream while one plays would cut
/// it short, so stop keeps the device open until the chirp is done.
fn alarm_in_flight(alarm_until: Option<Instant>, now: Instant) -> bool {
    alarm_until.is_some_and(|until| now < until)
}

/// Cloneable handle to the audio engine.
///
/// The engine runs on a dedicated thread that owns the non-Send rodio
/// objects; commands are fire-and-forget. A missing or failing audio device
/// is logged on the engine thread and never reaches timer or task state.
#[derive(Clone)]
pub struct AudioEngineHandle {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
}

impl AudioEngineHandle {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>> {
        let mut guard = self
            .tx
            .lock()
            .map_err(|_| anyhow!("audio engine state poisoned"))?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        // Dedicated thread holding the non-Send output stream and sink.
        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut output: Option<(OutputStream, OutputStreamHandle)> = None;
                let mut noise: Option<Sink> = None;
                let mut alarm_until: Option<Instant> = None;

                fn ensure_output(
                    output: &mut Option<(OutputStream, OutputStreamHandle)>,
                ) -> Result<(), String> {
                    if output.is_none() {
                        let pair = OutputStream::try_default()
                            .map_err(|e| format!("failed to open audio output stream: {e}"))?;
                        *output = Some(pair);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::StartNoise => {
                            // At most one noise loop: replace any running one.
                            if let Some(old) = noise.take() {
                                old.stop();
                            }
                            if let Err(e) = ensure_output(&mut output) {
                                error!("{e}");
                                continue;
                            }
                            if let Some((_, handle)) = output.as_ref() {
                                match Sink::try_new(handle) {
                                    Ok(sink) => {
                                        sink.set_volume(NOISE_VOLUME);
                                        sink.append(BrownNoiseLoop::generate().into_source());
                                        noise = Some(sink);
                                    }
                                    Err(e) => error!("failed to create noise sink: {e}"),
                                }
                            }
                        }
                        AudioCommand::StopNoise => {
                            if let Some(sink) = noise.take() {
                                sink.stop();
                            }
                            // Release the output device until the next start,
                            // unless an alarm chirp is still mixing on it.
                            if !alarm_in_flight(alarm_until, Instant::now()) {
                                output = None;
                            }
                        }
                        AudioCommand::PlayAlarm => {
                            if let Err(e) = ensure_output(&mut output) {
                                error!("{e}");
                                continue;
                            }
                            if let Some((_, handle)) = output.as_ref() {
                                // Fire-and-forget; overlapping alarms mix.
                                match handle.play_raw(AlarmChirp::generate().into_source()) {
                                    Ok(()) => {
                                        alarm_until =
                                            Some(Instant::now() + alarm::chirp_duration());
                                    }
                                    Err(e) => error!("failed to play alarm: {e}"),
                                }
                            }
                        }
                    }
                }
            })
            .map_err(|e| anyhow!("failed to spawn audio engine thread: {e}"))?;

        let tx_clone = tx.clone();
        *guard = Some(tx);
        Ok(tx_clone)
    }

    fn send(&self, cmd: AudioCommand) -> Result<()> {
        self.ensure_thread()?
            .send(cmd)
            .map_err(|_| anyhow!("audio engine thread exited"))
    }

    /// Start the looped brown-noise bed, replacing any loop already playing.
    pub fn start_noise(&self) -> Result<()> {
        self.send(AudioCommand::StartNoise)
    }

    /// Stop the noise loop and release playback resources.
    /// Calling with nothing playing is a no-op.
    pub fn stop_noise(&self) -> Result<()> {
        let guard = self
            .tx
            .lock()
            .map_err(|_| anyhow!("audio engine state poisoned"))?;
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(AudioCommand::StopNoise);
        }
        Ok(())
    }

    /// Play the end-of-interval chirp.
    pub fn play_alarm(&self) -> Result<()> {
        self.send(AudioCommand::PlayAlarm)
    }
}

impl Default for AudioEngineHandle {
    fn default() -> Self {
        Self::new()
    }
}
