use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::buffer::SamplesBuffer;
use rodio::source::Repeat;
use rodio::Source;

use super::SAMPLE_RATE;

/// Seconds of audio in one generated loop.
const LOOP_SECS: u32 = 2;
/// Step size of the leaky integrator.
const STEP: f32 = 0.02;
/// Leak divisor; keeps the integrator bounded without clamping.
const LEAK: f32 = 1.02;
/// Restores loudness lost to the low-pass filter.
const MAKEUP_GAIN: f32 = 3.5;

/// Finite brown-noise buffer, played back as a seamless loop.
///
/// Brown noise is a leaky integral of white noise: power falls off 6 dB per
/// octave, which reads as a deep rumble rather than hiss. Generating it
/// procedurally avoids shipping any audio asset.
pub struct BrownNoiseLoop {
    samples: Vec<f32>,
}

impl BrownNoiseLoop {
    pub fn generate() -> Self {
        Self::generate_with(&mut StdRng::from_entropy())
    }

    /// Seedable variant for deterministic tests.
    pub fn generate_with(rng: &mut StdRng) -> Self {
        let len = (SAMPLE_RATE * LOOP_SECS) as usize;
        let mut samples = Vec::with_capacity(len);
        let mut last = 0.0f32;
        for _ in 0..len {
            let white: f32 = rng.gen_range(-1.0..1.0);
            // First-order low-pass recurrence: y[i] = (y[i-1] + 0.02*w) / 1.02.
            // Steady state keeps |y| <= 1, so |output| <= MAKEUP_GAIN.
            last = (last + STEP * white) / LEAK;
            samples.push(last * MAKEUP_GAIN);
        }
        Self { samples }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Infinite source looping the buffer; mono at the fixed sample rate.
    pub fn into_source(self) -> Repeat<SamplesBuffer<f32>> {
        SamplesBuffer::new(1, SAMPLE_RATE, self.samples).repeat_infinite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_covers_two_seconds() {
        let noise = BrownNoiseLoop::generate();
        assert_eq!(noise.samples().len(), (SAMPLE_RATE * LOOP_SECS) as usize);
    }

    #[test]
    fn samples_stay_within_makeup_gain_bound() {
        let noise = BrownNoiseLoop::generate();
        assert!(noise.samples().iter().all(|s| s.abs() <= MAKEUP_GAIN));
    }

    #[test]
    fn output_is_not_silence() {
        let noise = BrownNoiseLoop::generate();
        assert!(noise.samples().iter().any(|s| s.abs() > 1e-4));
    }

    #[test]
    fn same_seed_reproduces_the_buffer() {
        let a = BrownNoiseLoop::generate_with(&mut StdRng::seed_from_u64(7));
        let b = BrownNoiseLoop::generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a.samples(), b.samples());
    }

    #[test]
    fn low_pass_tames_sample_to_sample_jumps() {
        // Adjacent output samples can move by at most the white-noise step
        // plus what the leak removes, all scaled by the make-up gain.
        let noise = BrownNoiseLoop::generate_with(&mut StdRng::seed_from_u64(42));
        let max_jump = noise
            .samples()
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(0.0f32, f32::max);
        let bound = MAKEUP_GAIN * (STEP / LEAK + (1.0 - 1.0 / LEAK)) + 1e-4;
        assert!(max_jump <= bound, "max_jump = {max_jump}");
    }
}
