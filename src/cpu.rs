use std::thread;
use std::time::Duration;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

/// Something that can report whole-system CPU utilization.
pub trait LoadSource: Send {
    /// Blocks for `window` and returns the average utilization over it, in
    /// percent. `None` means the reading was unusable and should be skipped.
    fn sample(&mut self, window: Duration) -> Option<f32>;
}

#[derive(Debug)]
pub struct CpuMonitor {
    system: System,
}

impl CpuMonitor {
    pub fn new() -> Self {
        let mut system = System::new_with_specifics(
            RefreshKind::new().with_cpu(CpuRefreshKind::new().with_cpu_usage()),
        );

        // Baseline; the next refresh reports usage since this one
        system.refresh_cpu_usage();

        CpuMonitor { system }
    }

    pub fn refresh(&mut self) {
        self.system.refresh_cpu_usage();
    }

    pub fn cpu_usage(&self) -> f32 {
        self.system.global_cpu_usage()
    }
}

impl Default for CpuMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadSource for CpuMonitor {
    fn sample(&mut self, window: Duration) -> Option<f32> {
        thread::sleep(window);
        self.refresh();
        sanitize_sample(self.cpu_usage())
    }
}

/// Drops non-finite readings and pulls finite ones into [0, 100].
pub fn sanitize_sample(raw: f32) -> Option<f32> {
    raw.is_finite().then(|| raw.clamp(0.0, 100.0))
}
