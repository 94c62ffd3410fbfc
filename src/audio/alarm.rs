use std::f32::consts::TAU;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;

use super::SAMPLE_RATE;

const DURATION_SECS: f32 = 0.5;
/// Frequency reaches its target this far in, then holds.
const RAMP_SECS: f32 = 0.1;
const START_FREQ: f32 = 440.0;
const END_FREQ: f32 = 880.0;
const START_GAIN: f32 = 0.1;
const END_GAIN: f32 = 0.01;

/// Wall-clock length of one chirp; the engine keeps the output device open
/// at least this long after an alarm starts.
pub(crate) fn chirp_duration() -> Duration {
    Duration::from_secs_f32(DURATION_SECS)
}

/// End-of-interval chirp: a sine that sweeps up an octave and fades out.
///
/// Frequency ramps exponentially 440 Hz -> 880 Hz over the first 0.1 s,
/// amplitude decays exponentially 0.1 -> 0.01 across the whole 0.5 s.
/// Each call synthesizes its own buffer, so overlapping alarms mix freely.
pub struct AlarmChirp {
    samples: Vec<f32>,
}

impl AlarmChirp {
    pub fn generate() -> Self {
        let len = (SAMPLE_RATE as f32 * DURATION_SECS) as usize;
        let mut samples = Vec::with_capacity(len);
        // Integrate frequency into the phase so the sweep has no clicks.
        let mut phase = 0.0f32;
        for i in 0..len {
            let t = i as f32 / SAMPLE_RATE as f32;
            let freq = if t < RAMP_SECS {
                START_FREQ * (END_FREQ / START_FREQ).powf(t / RAMP_SECS)
            } else {
                END_FREQ
            };
            let gain = START_GAIN * (END_GAIN / START_GAIN).powf(t / DURATION_SECS);
            samples.push(phase.sin() * gain);
            phase = (phase + TAU * freq / SAMPLE_RATE as f32) % TAU;
        }
        Self { samples }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Finite mono source; plays once and ends.
    pub fn into_source(self) -> SamplesBuffer<f32> {
        SamplesBuffer::new(1, SAMPLE_RATE, self.samples)
    }
}
