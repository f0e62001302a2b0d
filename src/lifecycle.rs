use crate::animation::run_animation;
use crate::collector::{run_load_sampler, run_title_reporter};
use crate::config::Strings;
use crate::cpu::LoadSource;
use crate::state::SharedState;
use crate::tray::TraySink;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Timing of the two sampling loops.
#[derive(Debug, Clone, Copy)]
pub struct Windows {
    pub load: Duration,
    pub title: Duration,
}

/// Owns the stop flag and the three worker threads.
pub struct Lifecycle {
    state: Arc<SharedState>,
    phase: Phase,
    workers: Vec<(&'static str, JoinHandle<()>)>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Lifecycle {
            state: Arc::new(SharedState::new()),
            phase: Phase::Starting,
            workers: Vec::new(),
        }
    }

    pub fn state(&self) -> Arc<SharedState> {
        self.state.clone()
    }

    pub fn phase(&self) -> Phase {
        match self.phase {
            Phase::Running if self.state.is_stopped() => Phase::Stopping,
            phase => phase,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Startup failed before anything was launched.
    pub fn abort(&mut self) {
        self.state.request_stop();
        self.phase = Phase::Stopped;
    }

    /// Launches the load sampler, animation and title threads. Each sampling
    /// thread gets its own load source from `new_source`.
    pub fn start<S, L, F>(
        &mut self,
        frame_count: usize,
        windows: Windows,
        strings: Strings,
        sink: S,
        mut new_source: F,
    ) -> io::Result<()>
    where
        S: TraySink + Clone + 'static,
        L: LoadSource + 'static,
        F: FnMut() -> L,
    {
        if let Err(err) = self.spawn_all(frame_count, windows, strings, sink, &mut new_source) {
            log::error!("could not start worker threads: {}", err);
            self.shutdown();
            return Err(err);
        }
        self.phase = Phase::Running;
        log::info!("{} worker threads running", self.worker_count());
        Ok(())
    }

    fn spawn_all<S, L, F>(
        &mut self,
        frame_count: usize,
        windows: Windows,
        strings: Strings,
        sink: S,
        new_source: &mut F,
    ) -> io::Result<()>
    where
        S: TraySink + Clone + 'static,
        L: LoadSource + 'static,
        F: FnMut() -> L,
    {
        let state = self.state.clone();
        let mut source = new_source();
        self.spawn("load-sampler", move || {
            run_load_sampler(&state, &mut source, windows.load, frame_count)
        })?;

        let state = self.state.clone();
        let animation_sink = sink.clone();
        self.spawn("animation", move || {
            run_animation(&state, frame_count, &animation_sink)
        })?;

        let state = self.state.clone();
        let mut source = new_source();
        self.spawn("title-reporter", move || {
            run_title_reporter(&state, &mut source, windows.title, &strings, &sink)
        })?;

        Ok(())
    }

    fn spawn<F>(&mut self, name: &'static str, body: F) -> io::Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new().name(name.to_string()).spawn(body)?;
        self.workers.push((name, handle));
        Ok(())
    }

    /// Returns true for the request that actually initiated shutdown.
    pub fn request_stop(&self) -> bool {
        self.state.request_stop()
    }

    /// Raises the stop flag and waits for every worker to leave its loop.
    pub fn shutdown(&mut self) {
        if self.phase == Phase::Stopped {
            return;
        }
        self.state.request_stop();
        let started = Instant::now();

        for (name, handle) in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("{} thread panicked", name);
            }
        }

        self.phase = Phase::Stopped;
        log::info!(
            "workers stopped in {}ms (last load {:.0}%)",
            started.elapsed().as_millis(),
            self.state.latest_load()
        );
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
