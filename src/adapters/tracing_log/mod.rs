// Tracing log adapter - Progress events as structured log lines

use std::sync::Mutex;
use tracing::info;

use crate::engine::progress::{JobStatus, ProgressEvent, ProgressSink};

/// Logs progress through `tracing`, throttled to status changes and
/// every `step_percent` of progress.
pub struct TracingProgressSink {
    step_percent: u32,
    last: Mutex<Option<(JobStatus, u32)>>,
}

impl Default for TracingProgressSink {
    fn default() -> Self {
        Self::new(10)
    }
}

impl TracingProgressSink {
    pub fn new(step_percent: u32) -> Self {
        Self {
            step_percent: step_percent.clamp(1, 100),
            last: Mutex::new(None),
        }
    }

    /// Whether `event` crosses a step or changes status; records it if so
    fn should_log(&self, event: &ProgressEvent) -> bool {
        let bucket = (event.fraction * 100.0) as u32 / self.step_percent;
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let changed = match *last {
            Some((status, previous)) => status != event.status || bucket > previous,
            None => true,
        };
        if changed {
            *last = Some((event.status, bucket));
        }
        changed
    }
}

impl ProgressSink for TracingProgressSink {
    fn emit(&self, event: ProgressEvent) {
        if self.should_log(&event) {
            info!(
                status = %event.status,
                percent = (event.fraction * 1000.0).round() / 10.0,
                "Clip progress"
            );
        }
    }
}
