//! Terminal interaction: download prompts and the progress line

use async_trait::async_trait;
use std::io::{self, BufRead, IsTerminal, Write};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::model::Tool;
use crate::engine::progress::{ChannelProgressSink, JobStatus, ProgressEvent};
use crate::ports::DownloadConsent;

/// Asks on the terminal before downloading a missing tool
pub struct PromptConsent;

impl PromptConsent {
    fn ask(tool: Tool) -> bool {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            debug!("stdin is not a terminal, not downloading {}", tool);
            return false;
        }

        let mut stderr = io::stderr();
        let _ = write!(
            stderr,
            "{} was not found. Download it now? [y/N] ",
            tool
        );
        let _ = stderr.flush();

        let mut answer = String::new();
        match stdin.lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl DownloadConsent for PromptConsent {
    async fn approve(&self, tool: Tool) -> bool {
        tokio::task::spawn_blocking(move || Self::ask(tool))
            .await
            .unwrap_or(false)
    }
}

/// One-line progress display on stderr
pub fn render_progress(event: &ProgressEvent) -> String {
    const WIDTH: usize = 30;
    let filled = (event.fraction.clamp(0.0, 1.0) * WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:5.1}% {}",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        event.fraction * 100.0,
        event.status
    )
}

async fn draw(mut events: UnboundedReceiver<ProgressEvent>) {
    let mut stderr = io::stderr();
    let mut drew = false;
    while let Some(event) = events.recv().await {
        let _ = write!(stderr, "\r{}", render_progress(&event));
        let _ = stderr.flush();
        drew = true;
        if matches!(event.status, JobStatus::Finished | JobStatus::Failed) {
            break;
        }
    }
    if drew {
        let _ = writeln!(stderr);
    }
}

/// Progress bar fed through a channel; finishes when the sink is dropped
pub fn console_progress() -> (ChannelProgressSink, JoinHandle<()>) {
    let (sink, events) = ChannelProgressSink::channel();
    (sink, tokio::spawn(draw(events)))
}
