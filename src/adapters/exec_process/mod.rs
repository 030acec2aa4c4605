// Process adapter - Runs yt-dlp/ffmpeg through tokio::process

use async_trait::async_trait;
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::ports::{ExitReport, Invocation, ProcessRunner, ToolLine};

/// Keeps console windows from flashing up for every child on Windows
#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Command builder shared by every adapter that spawns a program
pub fn command<S: AsRef<OsStr>>(program: S) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    #[cfg(target_os = "windows")]
    cmd.creation_flags(CREATE_NO_WINDOW);
    cmd.env("PYTHONIOENCODING", "utf-8");
    cmd
}

/// Production process runner
#[derive(Debug, Default, Clone)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

/// Forward one pipe line by line; undecodable bytes are replaced
async fn forward_lines<R>(
    reader: Option<R>,
    lines: UnboundedSender<ToolLine>,
    wrap: fn(String) -> ToolLine,
) where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(|c| c == '\r' || c == '\n')
                    .to_string();
                // Keep draining even if nobody listens so the child never blocks
                let _ = lines.send(wrap(line));
            }
            Err(e) => {
                debug!("Pipe read failed: {}", e);
                break;
            }
        }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        lines: UnboundedSender<ToolLine>,
    ) -> io::Result<ExitReport> {
        let mut child = command(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        debug!(
            "Spawned {} (pid {:?})",
            invocation.program.display(),
            child.id()
        );

        let stdout = forward_lines(child.stdout.take(), lines.clone(), ToolLine::Stdout);
        let stderr = forward_lines(child.stderr.take(), lines, ToolLine::Stderr);
        let (status, _, _) = tokio::join!(child.wait(), stdout, stderr);
        let status = status?;

        Ok(ExitReport {
            success: status.success(),
            code: status.code(),
        })
    }

    async fn responds_to(&self, program: &Path, flag: &str) -> bool {
        let status = command(program)
            .arg(flag)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) => status.success(),
            Err(e) => {
                debug!("{} {} failed to start: {}", program.display(), flag, e);
                false
            }
        }
    }
}
