//! Main clip execution engine

use std::io;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::domain::model::{ClipRequest, FailureReason, HardwarePlan, JobOutcome, ToolPaths};
use crate::engine::command::DownloadJob;
use crate::engine::progress::{
    is_postprocessor_line, parse_download_fraction, JobStatus, ProgressRelay, ProgressSink,
};
use crate::ports::{ExitReport, Invocation, ProcessRunner, ToolLine};

const ERROR_PREFIX: &str = "ERROR:";

/// What the downloader printed while running
#[derive(Debug, Default)]
struct Transcript {
    stderr: Vec<String>,
    reported_errors: Vec<String>,
}

impl Transcript {
    fn stderr_text(&self) -> String {
        self.stderr.join("\n")
    }
}

/// Drives the downloader for a single clip request
pub struct ExecutionEngine {
    runner: Arc<dyn ProcessRunner>,
}

impl ExecutionEngine {
    /// Create a new engine on top of a process runner
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Execute one clip request.
    ///
    /// Exactly one downloader run per call; failures come back as
    /// [`JobOutcome::Failure`] rather than errors.
    pub async fn execute(
        &self,
        request: &ClipRequest,
        plan: &HardwarePlan,
        tools: &ToolPaths,
        sink: &dyn ProgressSink,
    ) -> JobOutcome {
        let started = Instant::now();
        let job = DownloadJob::from_request(request, plan, tools);
        let invocation = Invocation::new(&tools.downloader, job.to_args());

        info!("Starting clip of {}", request.source_url());
        info!("Output: {}", request.output_path().display());
        match (request.start(), request.end()) {
            (None, None) => info!("Time range: full video"),
            (start, end) => info!(
                "Time range: {} - {}",
                start.map(|t| t.format_hms()).unwrap_or_else(|| "start".to_string()),
                end.map(|t| t.format_hms()).unwrap_or_else(|| "end".to_string())
            ),
        }
        if job.uses_hardware() {
            info!(
                "Using hardware acceleration: {}",
                plan.codec_id.as_deref().unwrap_or_default()
            );
        }
        debug!("Invocation: {} {:?}", invocation.program.display(), invocation.args);

        let mut relay = ProgressRelay::new(sink);
        relay.start();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let run = self.runner.run(&invocation, tx);
        let watch = async {
            let mut transcript = Transcript::default();
            while let Some(line) = rx.recv().await {
                Self::observe(&line, &mut relay, &mut transcript);
            }
            transcript
        };
        let (result, transcript) = tokio::join!(run, watch);

        let outcome = Self::classify(request, result, &transcript);
        if outcome.is_success() {
            relay.finish();
            info!(
                "Clip completed in {:.2}s",
                started.elapsed().as_secs_f64()
            );
        } else {
            relay.fail();
            error!("{}", outcome);
        }
        outcome
    }

    fn observe(line: &ToolLine, relay: &mut ProgressRelay<'_>, transcript: &mut Transcript) {
        let text = match line {
            ToolLine::Stdout(text) => text,
            ToolLine::Stderr(text) => {
                transcript.stderr.push(text.clone());
                if text.trim_start().starts_with(ERROR_PREFIX) {
                    transcript.reported_errors.push(text.clone());
                }
                text
            }
        };

        if let Some(fraction) = parse_download_fraction(text) {
            relay.advance(JobStatus::Downloading, fraction);
        } else if is_postprocessor_line(text) {
            relay.set_status(JobStatus::PostProcessing);
            debug!("{}", text);
        } else if !text.trim().is_empty() {
            debug!("{}", text);
        }
    }

    fn classify(
        request: &ClipRequest,
        result: io::Result<ExitReport>,
        transcript: &Transcript,
    ) -> JobOutcome {
        match result {
            Err(e) if e.kind() == io::ErrorKind::NotFound => JobOutcome::Failure {
                reason: FailureReason::MissingBinary,
                detail: e.to_string(),
            },
            Err(e) => JobOutcome::Failure {
                reason: FailureReason::Io,
                detail: e.to_string(),
            },
            Ok(report) if !report.success => JobOutcome::Failure {
                reason: FailureReason::ToolExited { code: report.code },
                detail: transcript.stderr_text(),
            },
            Ok(_) if !transcript.reported_errors.is_empty() => {
                warn!("Downloader exited cleanly but reported errors");
                JobOutcome::Failure {
                    reason: FailureReason::ToolReportedError,
                    detail: transcript.reported_errors.join("\n"),
                }
            }
            Ok(_) => JobOutcome::Success {
                output_path: request.output_path(),
            },
        }
    }
}
