use crate::config::Strings;
use crate::cpu::LoadSource;
use crate::rate::PlaybackRate;
use crate::state::SharedState;
use crate::tray::TraySink;
use std::time::Duration;

/// Samples CPU load back to back and publishes the playback rate it maps to.
/// A failed sample leaves the previous rate in place.
pub fn run_load_sampler<L: LoadSource>(
    state: &SharedState,
    source: &mut L,
    window: Duration,
    frame_count: usize,
) {
    let mut skipped = 0u64;

    while !state.is_stopped() {
        match source.sample(window) {
            Some(load) => state.publish(load, PlaybackRate::for_load(load, frame_count)),
            None => {
                skipped += 1;
                log::debug!("load sample skipped ({} so far)", skipped);
            }
        }
    }

    log::debug!("load sampler stopped");
}

/// Samples CPU load over a longer window and shows it as the tray title.
pub fn run_title_reporter<L: LoadSource, S: TraySink>(
    state: &SharedState,
    source: &mut L,
    window: Duration,
    strings: &Strings,
    sink: &S,
) {
    while !state.is_stopped() {
        match source.sample(window) {
            Some(load) => sink.set_title(strings.title(load)),
            None => log::debug!("title sample skipped"),
        }
    }

    log::debug!("title reporter stopped");
}
