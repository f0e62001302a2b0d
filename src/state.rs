use crate::rate::PlaybackRate;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Values shared between the sampling, animation and title threads.
///
/// Delay and step are stored separately, so a reader can see one of them
/// updated before the other. That is harmless for a single tick.
#[derive(Debug)]
pub struct SharedState {
    stop: AtomicBool,
    delay_nanos: AtomicU64,
    step: AtomicUsize,
    load_bits: AtomicU32,
}

impl SharedState {
    pub fn new() -> Self {
        let initial = PlaybackRate::INITIAL;
        SharedState {
            stop: AtomicBool::new(false),
            delay_nanos: AtomicU64::new(initial.delay.as_nanos() as u64),
            step: AtomicUsize::new(initial.step),
            load_bits: AtomicU32::new(0f32.to_bits()),
        }
    }

    /// Returns true only for the call that actually flipped the flag.
    pub fn request_stop(&self) -> bool {
        !self.stop.swap(true, Ordering::AcqRel)
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    pub fn publish(&self, load: f32, rate: PlaybackRate) {
        self.load_bits.store(load.to_bits(), Ordering::Relaxed);
        self.delay_nanos
            .store(rate.delay.as_nanos() as u64, Ordering::Relaxed);
        self.step.store(rate.step, Ordering::Relaxed);
    }

    pub fn rate(&self) -> PlaybackRate {
        PlaybackRate {
            delay: Duration::from_nanos(self.delay_nanos.load(Ordering::Relaxed)),
            step: self.step.load(Ordering::Relaxed),
        }
    }

    /// Most recent load published by the sampler, 0 before the first one.
    pub fn latest_load(&self) -> f32 {
        f32::from_bits(self.load_bits.load(Ordering::Relaxed))
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_seeded_with_initial_rate() {
        let state = SharedState::new();
        assert_eq!(state.rate(), PlaybackRate::INITIAL);
        assert_eq!(state.latest_load(), 0.0);
        assert!(!state.is_stopped());
    }

    #[test]
    fn test_publish_round_trips() {
        let state = SharedState::new();
        let rate = PlaybackRate::for_load(73.5, 60);
        state.publish(73.5, rate);
        assert_eq!(state.rate(), rate);
        assert_eq!(state.latest_load(), 73.5);
    }

    #[test]
    fn test_stop_is_one_shot() {
        let state = SharedState::new();
        assert!(state.request_stop());
        assert!(state.is_stopped());
        assert!(!state.request_stop());
        assert!(state.is_stopped());
    }

    #[test]
    fn test_only_one_thread_wins_stop() {
        let state = Arc::new(SharedState::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = state.clone();
                thread::spawn(move || state.request_stop())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
