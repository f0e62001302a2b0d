use crate::state::SharedState;
use crate::tray::TraySink;
use std::thread;

/// Playback position in a cyclic frame sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCursor {
    index: usize,
    len: usize,
}

impl FrameCursor {
    /// `len` is clamped to at least one frame.
    pub fn new(len: usize) -> Self {
        FrameCursor {
            index: 0,
            len: len.max(1),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn advance(&mut self, step: usize) {
        self.index = (self.index + step % self.len) % self.len;
    }
}

/// Pushes frames to the tray until the stop flag is raised, pacing itself
/// with whatever rate the load sampler last published.
pub fn run_animation<S: TraySink>(state: &SharedState, frame_count: usize, sink: &S) {
    let mut cursor = FrameCursor::new(frame_count);
    log::debug!("animation started with {} frames", frame_count);

    while !state.is_stopped() {
        sink.show_frame(cursor.index());
        let rate = state.rate();
        cursor.advance(rate.step);
        thread::sleep(rate.delay);
    }

    log::debug!("animation stopped at frame {}", cursor.index());
}
