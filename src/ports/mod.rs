// Ports - Interface definitions (contracts)

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedSender;

use crate::config_initialization::ClipperConfig;
use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for GPU capability probing.
///
/// Implementations never fail: anything that goes wrong is logged and
/// reported as `None`, which callers treat as "encode in software".
#[async_trait]
pub trait GpuProbePort: Send + Sync {
    /// Detect the GPU vendor relevant for encoder selection
    async fn detect(&self, os: HostOs) -> Option<GpuInfo>;
}

/// One line written by a child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolLine {
    Stdout(String),
    Stderr(String),
}

/// A program and its argument vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub success: bool,
    /// `None` when terminated by a signal
    pub code: Option<i32>,
}

/// Port for running external programs
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion, forwarding every output line as it arrives.
    ///
    /// The sender is dropped when both pipes are closed. Spawn failures are
    /// returned as I/O errors so callers can tell a missing binary apart.
    async fn run(
        &self,
        invocation: &Invocation,
        lines: UnboundedSender<ToolLine>,
    ) -> std::io::Result<ExitReport>;

    /// Whether the program starts and exits successfully with `flag`
    async fn responds_to(&self, program: &Path, flag: &str) -> bool;
}

/// Port for making sure yt-dlp and ffmpeg are available
#[async_trait]
pub trait DependencyPort: Send + Sync {
    /// Find a working copy without fetching anything
    async fn locate(&self, tool: Tool) -> Option<PathBuf>;

    /// Find a working copy, fetching it into the managed directory if needed
    async fn ensure_present(&self, tool: Tool) -> Result<PathBuf, DomainError>;
}

/// Port for fetching release artifacts of a tool
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Place the tool's executable(s) into `dest_dir` and return the main one
    async fn fetch(&self, tool: Tool, dest_dir: &Path) -> Result<PathBuf, DomainError>;
}

/// Port asking the user whether a missing tool may be downloaded
#[async_trait]
pub trait DownloadConsent: Send + Sync {
    async fn approve(&self, tool: Tool) -> bool;
}

/// Consent that always gives the same answer
pub struct FixedConsent(pub bool);

#[async_trait]
impl DownloadConsent for FixedConsent {
    async fn approve(&self, _tool: Tool) -> bool {
        self.0
    }
}

/// Port for configuration management
pub trait ConfigPort: Send + Sync {
    /// Load configuration layered over the defaults
    fn load(&self) -> Result<ClipperConfig, DomainError>;
}
