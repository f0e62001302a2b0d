//! Maps CPU load onto animation playback speed.
//!
//! Idle CPU plays the animation at 100 ms per frame, one frame at a time.
//! Saturated CPU plays it at 5 ms per frame and skips ahead up to a sixth of
//! the sequence per tick. Both ends are clamped so the tray host is never
//! updated faster than 200 times a second and the step never stalls at zero.

use std::time::Duration;

const MAX_DELAY_SECS: f64 = 0.1;
const MIN_DELAY_SECS: f64 = 0.005;
const DELAY_PER_PERCENT: f64 = 0.00095;

/// Extra frames skipped per tick at full load.
const MAX_EXTRA_STEP: f64 = 3.0;
/// The step never exceeds `frame_count / STEP_DIVISOR` (but is at least 1).
const STEP_DIVISOR: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackRate {
    pub delay: Duration,
    pub step: usize,
}

impl PlaybackRate {
    /// Used until the first load sample arrives.
    pub const INITIAL: PlaybackRate = PlaybackRate {
        delay: Duration::from_millis(50),
        step: 1,
    };

    pub fn for_load(cpu: f32, frame_count: usize) -> Self {
        PlaybackRate {
            delay: frame_delay(cpu),
            step: frame_step(cpu, frame_count),
        }
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Clamps a raw reading into [0, 100]; NaN and infinities read as idle.
pub fn normalize_load(cpu: f32) -> f64 {
    if cpu.is_finite() {
        f64::from(cpu).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn frame_delay(cpu: f32) -> Duration {
    let cpu = normalize_load(cpu);
    let secs = (MAX_DELAY_SECS - DELAY_PER_PERCENT * cpu).clamp(MIN_DELAY_SECS, MAX_DELAY_SECS);
    Duration::from_secs_f64(secs)
}

/// For fewer than six frames this is always 1.
pub fn frame_step(cpu: f32, frame_count: usize) -> usize {
    let idle = 1.0 - normalize_load(cpu) / 100.0;
    let step = 1 + ((1.0 - idle) * MAX_EXTRA_STEP).floor() as usize;
    let ceiling = (frame_count / STEP_DIVISOR).max(1);
    step.clamp(1, ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn loads() -> impl Iterator<Item = f32> {
        (0..=1000).map(|i| i as f32 / 10.0)
    }

    #[test]
    fn test_delay_bounds_and_monotonic() {
        let mut previous = Duration::MAX;
        for cpu in loads() {
            let delay = frame_delay(cpu);
            assert!(delay >= Duration::from_secs_f64(MIN_DELAY_SECS), "cpu {cpu}");
            assert!(delay <= Duration::from_secs_f64(MAX_DELAY_SECS), "cpu {cpu}");
            assert!(delay <= previous, "delay rose at cpu {cpu}");
            previous = delay;
        }
    }

    #[test]
    fn test_step_bounds() {
        for frame_count in 1..=60 {
            let ceiling = (frame_count / 6).max(1);
            let mut previous = 0;
            for cpu in loads() {
                let step = frame_step(cpu, frame_count);
                assert!((1..=ceiling).contains(&step), "n {frame_count} cpu {cpu}");
                assert!(step >= previous, "step fell at n {frame_count} cpu {cpu}");
                previous = step;
            }
        }
    }

    #[test]
    fn test_idle_load() {
        let rate = PlaybackRate::for_load(0.0, 60);
        assert_relative_eq!(rate.delay.as_secs_f64(), 0.1, epsilon = 1e-9);
        assert_eq!(rate.step, 1);
    }

    #[test]
    fn test_saturated_load() {
        assert_relative_eq!(frame_delay(100.0).as_secs_f64(), 0.005, epsilon = 1e-9);
        assert_eq!(frame_step(100.0, 60), 4);
        assert_eq!(frame_step(100.0, 18), 3);
        assert_eq!(frame_step(100.0, 12), 2);
    }

    #[test]
    fn test_half_load() {
        assert_relative_eq!(frame_delay(50.0).as_secs_f64(), 0.0525, epsilon = 1e-9);
        assert_eq!(frame_step(50.0, 60), 2);
    }

    #[test]
    fn test_short_sequences_always_step_one() {
        for frame_count in 1..6 {
            assert_eq!(frame_step(0.0, frame_count), 1);
            assert_eq!(frame_step(100.0, frame_count), 1);
        }
    }

    #[test]
    fn test_bad_readings_are_clamped() {
        assert_eq!(PlaybackRate::for_load(f32::NAN, 60), PlaybackRate::for_load(0.0, 60));
        assert_eq!(PlaybackRate::for_load(-20.0, 60), PlaybackRate::for_load(0.0, 60));
        assert_eq!(PlaybackRate::for_load(250.0, 60), PlaybackRate::for_load(100.0, 60));
        assert_eq!(PlaybackRate::for_load(f32::INFINITY, 60).step, 1);
    }

    #[test]
    fn test_initial_rate() {
        assert_eq!(PlaybackRate::default(), PlaybackRate::INITIAL);
        assert_eq!(PlaybackRate::INITIAL.delay, Duration::from_millis(50));
        assert_eq!(PlaybackRate::INITIAL.step, 1);
    }
}
