//! Progress reporting for clip jobs
//!
//! The engine pushes [`ProgressEvent`]s into a [`ProgressSink`]; it has no
//! idea who is listening. [`ProgressRelay`] sits in between and guarantees
//! the fraction never goes backwards and ends at 1.0 on success.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

static DOWNLOAD_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[download\]\s+([0-9]+(?:\.[0-9]+)?)%").expect("valid progress regex")
});

static POSTPROCESSOR_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(VideoConvertor|ExtractAudio|Merger|Fixup\w*)\]")
        .expect("valid postprocessor regex")
});

/// Job phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Downloader launched, nothing received yet
    Starting,
    /// Fetching media
    Downloading,
    /// Cutting, converting or extracting audio
    PostProcessing,
    /// Completed successfully
    Finished,
    /// Completed with an error
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Starting => "starting",
            JobStatus::Downloading => "downloading",
            JobStatus::PostProcessing => "post-processing",
            JobStatus::Finished => "finished",
            JobStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// A single progress update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub status: JobStatus,
    /// Completed share of the job in [0, 1]
    pub fraction: f64,
}

/// Receiver of progress events
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Discards all events
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Forwards events over an unbounded channel, e.g. to a UI task
#[derive(Clone)]
pub struct ChannelProgressSink {
    tx: UnboundedSender<ProgressEvent>,
}

impl ChannelProgressSink {
    pub fn channel() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: ProgressEvent) {
        // Receiver gone means nobody is watching anymore
        let _ = self.tx.send(event);
    }
}

/// Enforces monotonic progress in front of a sink
pub struct ProgressRelay<'a> {
    sink: &'a dyn ProgressSink,
    status: JobStatus,
    fraction: f64,
}

impl<'a> ProgressRelay<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            status: JobStatus::Starting,
            fraction: 0.0,
        }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Announce the job
    pub fn start(&mut self) {
        self.publish();
    }

    /// Report a new fraction; values below the current one are dropped
    pub fn advance(&mut self, status: JobStatus, fraction: f64) {
        let fraction = if fraction.is_nan() {
            self.fraction
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let moved = fraction > self.fraction;
        let changed = status != self.status;
        if moved {
            self.fraction = fraction;
        }
        if changed {
            self.status = status;
        }
        if moved || changed {
            self.publish();
        }
    }

    /// Change phase without moving the fraction
    pub fn set_status(&mut self, status: JobStatus) {
        let fraction = self.fraction;
        self.advance(status, fraction);
    }

    /// Success: force the bar to full
    pub fn finish(&mut self) {
        self.status = JobStatus::Finished;
        self.fraction = 1.0;
        self.publish();
    }

    /// Failure: keep the fraction where it stopped
    pub fn fail(&mut self) {
        self.status = JobStatus::Failed;
        self.publish();
    }

    fn publish(&self) {
        self.sink.emit(ProgressEvent {
            status: self.status,
            fraction: self.fraction,
        });
    }
}

/// Download percentage from a `[download]  42.0% of ...` line, as a fraction
pub fn parse_download_fraction(line: &str) -> Option<f64> {
    DOWNLOAD_PERCENT
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|percent| percent / 100.0)
}

/// Whether a line comes from one of the downloader's post-processors
pub fn is_postprocessor_line(line: &str) -> bool {
    POSTPROCESSOR_TAG.is_match(line.trim_start())
}
