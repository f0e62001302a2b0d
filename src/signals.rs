//! SIGINT/SIGTERM count as choosing "exit" from the tray menu.
//!
//! The handler only flips an atomic; the tray event loop polls it.

use std::sync::atomic::{AtomicBool, Ordering};

static EXIT_REQUESTED: AtomicBool = AtomicBool::new(false);

pub fn exit_requested() -> bool {
    EXIT_REQUESTED.load(Ordering::Acquire)
}

#[cfg(unix)]
extern "C" fn on_signal(_signum: libc::c_int) {
    EXIT_REQUESTED.store(true, Ordering::Release);
}

/// Points `signum` at the exit handler and returns the disposition it
/// replaced, or `None` if the kernel refused.
#[cfg(unix)]
fn set_handler(signum: libc::c_int) -> Option<libc::sighandler_t> {
    let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
    let previous = unsafe { libc::signal(signum, handler) };
    (previous != libc::SIG_ERR).then_some(previous)
}

/// Best effort; a failed install only means signals kill the process outright.
#[cfg(unix)]
pub fn install() {
    for signum in [libc::SIGINT, libc::SIGTERM] {
        if set_handler(signum).is_none() {
            log::warn!("could not install handler for signal {}", signum);
        }
    }
}

#[cfg(not(unix))]
pub fn install() {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    // SIGUSR1 so the test runner's own SIGINT/SIGTERM handling is left alone.
    #[test]
    fn test_handled_signal_sets_flag() {
        let previous = set_handler(libc::SIGUSR1).unwrap();
        assert!(!exit_requested());
        unsafe {
            libc::raise(libc::SIGUSR1);
        }
        let raised = exit_requested();

        unsafe {
            libc::signal(libc::SIGUSR1, previous);
        }
        EXIT_REQUESTED.store(false, Ordering::Release);
        assert!(raised);
    }
}
