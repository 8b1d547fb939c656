//! Seeded frame pacing.
//!
//! Real render loops never hit their nominal frame rate exactly. The pacer
//! draws each frame length from a normal distribution around `1 / fps`, so
//! playback is exercised with uneven elapsed times while staying fully
//! reproducible from the seed.

use crate::error::SimError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

/// Shortest frame, as a fraction of the nominal one.
const MIN_FRAME_FRACTION: f64 = 0.05;

/// Produces per-frame durations.
#[derive(Debug, Clone)]
pub struct FramePacer {
    /// Nominal frame length in seconds
    nominal: f64,

    /// Frame length scale factor, mean 1
    factor: Normal<f64>,

    rng: ChaCha8Rng,
}

impl FramePacer {
    /// Creates a pacer at `fps` frames per second, with frame lengths
    /// varying by `jitter` (standard deviation as a fraction of a frame).
    pub fn new(fps: f64, jitter: f64, seed: u64) -> Result<Self, SimError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(SimError::config(format!("fps must be positive, got {}", fps)));
        }
        if !(jitter.is_finite() && (0.0..1.0).contains(&jitter)) {
            return Err(SimError::config(format!(
                "jitter must be in [0, 1), got {}",
                jitter
            )));
        }

        let factor = Normal::new(1.0, jitter).map_err(|e| SimError::config(e.to_string()))?;
        Ok(Self {
            nominal: 1.0 / fps,
            factor,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Nominal frame length in seconds.
    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    /// Length of the next frame.
    pub fn next_frame(&mut self) -> Duration {
        let factor = self.factor.sample(&mut self.rng).max(MIN_FRAME_FRACTION);
        Duration::from_secs_f64(self.nominal * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_jitter_is_constant() {
        let mut pacer = FramePacer::new(50.0, 0.0, 7).unwrap();
        for _ in 0..10 {
            assert_eq!(pacer.next_frame(), Duration::from_millis(20));
        }
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = FramePacer::new(60.0, 0.3, 42).unwrap();
        let mut b = FramePacer::new(60.0, 0.3, 42).unwrap();
        let mut c = FramePacer::new(60.0, 0.3, 43).unwrap();

        let frames_a: Vec<Duration> = (0..100).map(|_| a.next_frame()).collect();
        let frames_b: Vec<Duration> = (0..100).map(|_| b.next_frame()).collect();
        let frames_c: Vec<Duration> = (0..100).map(|_| c.next_frame()).collect();

        assert_eq!(frames_a, frames_b);
        assert_ne!(frames_a, frames_c);
    }

    #[test]
    fn test_jitter_stays_positive_and_centered() {
        let mut pacer = FramePacer::new(60.0, 0.5, 1).unwrap();
        let frames: Vec<f64> = (0..5000).map(|_| pacer.next_frame().as_secs_f64()).collect();

        assert!(frames.iter().all(|&f| f >= pacer.nominal() * MIN_FRAME_FRACTION * 0.999));
        let mean = frames.iter().sum::<f64>() / frames.len() as f64;
        assert!((mean - pacer.nominal()).abs() < pacer.nominal() * 0.1);
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(FramePacer::new(0.0, 0.1, 1).is_err());
        assert!(FramePacer::new(f64::NAN, 0.1, 1).is_err());
        assert!(FramePacer::new(60.0, -0.1, 1).is_err());
        assert!(FramePacer::new(60.0, 1.0, 1).is_err());
    }
}
