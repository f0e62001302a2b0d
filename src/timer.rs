//! Finer OS timer resolution for the lifetime of the process.
//!
//! Windows rounds `thread::sleep` up to its ~15.6 ms scheduler tick, which
//! would cap the animation well below its fastest rate. Other platforms
//! already sleep with sub-millisecond precision and need nothing.

const RESOLUTION_MS: u32 = 1;

#[cfg(target_os = "windows")]
mod sys {
    #[link(name = "winmm")]
    unsafe extern "system" {
        fn timeBeginPeriod(period: u32) -> u32;
        fn timeEndPeriod(period: u32) -> u32;
    }

    /// True on success (TIMERR_NOERROR).
    pub fn begin(period: u32) -> bool {
        unsafe { timeBeginPeriod(period) == 0 }
    }

    pub fn end(period: u32) -> bool {
        unsafe { timeEndPeriod(period) == 0 }
    }
}

#[cfg(not(target_os = "windows"))]
mod sys {
    pub fn begin(_period: u32) -> bool {
        false
    }

    pub fn end(_period: u32) -> bool {
        true
    }
}

// RAII wrapper; restores the previous resolution on drop
pub struct TimerResolution {
    active: bool,
}

impl TimerResolution {
    /// Best effort: failure is logged and the guard simply does nothing.
    pub fn raise() -> Self {
        let active = sys::begin(RESOLUTION_MS);
        if active {
            log::debug!("timer resolution raised to {}ms", RESOLUTION_MS);
        } else if cfg!(target_os = "windows") {
            log::warn!("could not raise timer resolution; animation may run slower");
        }
        TimerResolution { active }
    }
}

impl Drop for TimerResolution {
    fn drop(&mut self) {
        if self.active && !sys::end(RESOLUTION_MS) {
            log::warn!("could not restore timer resolution");
        }
    }
}
