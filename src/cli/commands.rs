//! Command implementations

use anyhow::{Context, Result};
use std::io::{self, IsTerminal};
use tracing::{info, warn};

use crate::adapters::TracingProgressSink;
use crate::app::{AppContainer, ClipReport, DependencyStatus, ProbeReport};
use crate::cli::args::{ClipArgs, DepsArgs, ProbeArgs};
use crate::cli::console;
use crate::config_initialization::ClipperConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::{JobOutcome, Tool};
use crate::domain::rules::RawClipForm;

/// Execute the clip command
pub async fn clip(container: &dyn AppContainer, args: ClipArgs, config: &ClipperConfig) -> Result<()> {
    let form = RawClipForm {
        url: args.url.unwrap_or_default(),
        start: args.start,
        end: args.end,
        format: args
            .format
            .unwrap_or_else(|| config.clipper.default_format.clone()),
        quality: args
            .quality
            .unwrap_or_else(|| config.clipper.default_quality.clone()),
        output: args.output.unwrap_or_default(),
    };

    if config.clipper.hardware_acceleration && !config.clipper.wait_for_probe {
        // Detached; the clip takes whatever plan is ready when it starts
        let _probe = container.session().spawn_hardware_probe();
    }

    let interactor = container.clip_interactor();
    let result = if !args.json && io::stderr().is_terminal() {
        let (sink, drawer) = console::console_progress();
        let result = interactor.execute(&form, &sink).await;
        drop(sink);
        let _ = drawer.await;
        result
    } else {
        let sink = TracingProgressSink::default();
        interactor.execute(&form, &sink).await
    };
    let report = result.context("Clip was not started")?;

    info!(
        "Clip finished in {:.1}s (encoder: {})",
        report.elapsed_seconds(),
        report.hardware.codec_id.as_deref().unwrap_or("software")
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.outcome.is_success() {
        println!("{}", report.outcome);
    }

    Ok(fail_on_error(&report)?)
}

fn fail_on_error(report: &ClipReport) -> Result<(), DomainError> {
    match &report.outcome {
        JobOutcome::Success { .. } => Ok(()),
        JobOutcome::Failure { reason, detail } if detail.is_empty() => {
            Err(DomainError::ExecutionFailure(reason.to_string()))
        }
        JobOutcome::Failure { reason, detail } => Err(DomainError::ExecutionFailure(format!(
            "{}\n{}",
            reason, detail
        ))),
    }
}

/// Execute the deps command
pub async fn deps(container: &dyn AppContainer, args: DepsArgs) -> Result<()> {
    let interactor = container.dependency_interactor();

    let statuses = interactor
        .status()
        .await
        .context("Failed to check dependencies")?;
    for status in statuses.iter().filter(|status| !status.is_present()) {
        warn!("{} was not found", status.tool);
    }

    let statuses = if statuses.iter().all(DependencyStatus::is_present) {
        statuses
    } else {
        let tools = interactor
            .ensure()
            .await
            .context("Failed to provide yt-dlp and ffmpeg")?;
        Tool::ALL
            .into_iter()
            .map(|tool| DependencyStatus {
                tool,
                path: Some(tools.get(tool).to_path_buf()),
            })
            .collect()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else {
        for status in &statuses {
            match &status.path {
                Some(path) => println!("{:<8} {}", status.tool.program(), path.display()),
                None => println!("{:<8} missing", status.tool.program()),
            }
        }
    }

    Ok(())
}

/// Execute the probe command
pub async fn probe(container: &dyn AppContainer, args: ProbeArgs) -> Result<()> {
    let report = container
        .probe_interactor()
        .probe()
        .await
        .context("Failed to probe the GPU")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", describe_probe(&report));
    }

    Ok(())
}

fn describe_probe(report: &ProbeReport) -> String {
    let mut text = format!("OS:      {}\n", report.os);
    match &report.gpu {
        Some(gpu) => text.push_str(&format!("GPU:     {} ({})\n", gpu.name, gpu.vendor)),
        None => text.push_str("GPU:     none detected\n"),
    }
    match &report.plan.codec_id {
        Some(codec) => {
            text.push_str(&format!("Encoder: {}\n", codec));
            text.push_str(&format!("Flags:   {}\n", report.plan.extra_args().join(" ")));
        }
        None => text.push_str("Encoder: software (libx264)\n"),
    }
    text
}
