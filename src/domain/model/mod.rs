// Domain models - Core types and data structures

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::domain::errors::ValidationError;
use crate::error::ClipperResult;
use crate::utils::time::TimeParser;

/// A point in the source video, in seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Parse a user-supplied time field.
    ///
    /// `Ok(None)` means the field was left empty.
    pub fn parse(time_str: &str) -> ClipperResult<Option<Self>> {
        Ok(TimeParser::new()
            .parse_time(time_str)?
            .map(Self::from_seconds))
    }

    /// Format as H:MM:SS.mmm
    pub fn format_hms(&self) -> String {
        TimeParser::new().format_time(self.seconds)
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// Optional start/end restriction of a clip
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<TimeSpec>,
    pub end: Option<TimeSpec>,
}

impl TimeWindow {
    /// Create a window, rejecting anything but `start < end` when both
    /// bounds are set (NaN included)
    pub fn new(start: Option<TimeSpec>, end: Option<TimeSpec>) -> Result<Self, ValidationError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start.seconds.partial_cmp(&end.seconds) != Some(Ordering::Less) {
                return Err(ValidationError::StartNotBeforeEnd {
                    start: start.seconds,
                    end: end.seconds,
                });
            }
        }
        Ok(Self { start, end })
    }

    /// Whole video, no restriction
    pub fn full() -> Self {
        Self::default()
    }

    pub fn is_restricted(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Length in seconds when both bounds are known
    pub fn span_seconds(&self) -> Option<f64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(end.seconds - start.seconds),
            _ => None,
        }
    }

    /// Downloader section expression, e.g. `*10-20`.
    ///
    /// An unset start reads from the beginning and an unset end runs to the
    /// end of the video. `None` when no bound is set.
    pub fn download_section(&self) -> Option<String> {
        if !self.is_restricted() {
            return None;
        }
        let parser = TimeParser::new();
        let start = self
            .start
            .map(|t| parser.format_seconds(t.seconds))
            .unwrap_or_else(|| "0".to_string());
        let end = self
            .end
            .map(|t| parser.format_seconds(t.seconds))
            .unwrap_or_else(|| "inf".to_string());
        Some(format!("*{}-{}", start, end))
    }
}

/// Output container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Mp4,
    Webm,
    Mkv,
    Mp3,
    Wav,
    Aac,
}

impl Container {
    pub const ALL: [Container; 6] = [
        Container::Mp4,
        Container::Webm,
        Container::Mkv,
        Container::Mp3,
        Container::Wav,
        Container::Aac,
    ];

    /// File extension, also the downloader's format name
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Webm => "webm",
            Container::Mkv => "mkv",
            Container::Mp3 => "mp3",
            Container::Wav => "wav",
            Container::Aac => "aac",
        }
    }

    pub fn is_audio_only(&self) -> bool {
        matches!(self, Container::Mp3 | Container::Wav | Container::Aac)
    }

    /// Whether H.264 video can be muxed into this container
    pub fn accepts_h264(&self) -> bool {
        matches!(self, Container::Mp4 | Container::Mkv)
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Container {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('.').to_lowercase();
        Container::ALL
            .iter()
            .copied()
            .find(|c| c.extension() == wanted)
            .ok_or_else(|| ValidationError::UnknownContainer(s.trim().to_string()))
    }
}

/// Video quality preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    Best,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "360p")]
    P360,
}

impl Quality {
    /// Height cap, `None` for `Best`
    pub fn max_height(&self) -> Option<u32> {
        match self {
            Quality::Best => None,
            Quality::P1080 => Some(1080),
            Quality::P720 => Some(720),
            Quality::P480 => Some(480),
            Quality::P360 => Some(360),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_height() {
            Some(height) => write!(f, "{}p", height),
            None => f.write_str("Best"),
        }
    }
}

impl FromStr for Quality {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best" => Ok(Quality::Best),
            "1080p" | "1080" => Ok(Quality::P1080),
            "720p" | "720" => Ok(Quality::P720),
            "480p" | "480" => Ok(Quality::P480),
            "360p" | "360" => Ok(Quality::P360),
            _ => Err(ValidationError::UnknownQuality(s.trim().to_string())),
        }
    }
}

/// A validated clip job. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipRequest {
    source_url: String,
    window: TimeWindow,
    container: Container,
    quality: Quality,
    output_base: PathBuf,
}

impl ClipRequest {
    /// Create a clip request; `output_base` must already be extension-free
    pub fn new(
        source_url: impl Into<String>,
        window: TimeWindow,
        container: Container,
        quality: Quality,
        output_base: impl Into<PathBuf>,
    ) -> Result<Self, ValidationError> {
        let source_url = source_url.into();
        let output_base = output_base.into();
        if source_url.trim().is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        if output_base.as_os_str().is_empty() {
            return Err(ValidationError::MissingOutputPath);
        }
        Ok(Self {
            source_url,
            window,
            container,
            quality,
            output_base,
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn start(&self) -> Option<TimeSpec> {
        self.window.start
    }

    pub fn end(&self) -> Option<TimeSpec> {
        self.window.end
    }

    pub fn container(&self) -> Container {
        self.container
    }

    /// Requested quality; meaningless for audio-only containers
    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn is_audio_only(&self) -> bool {
        self.container.is_audio_only()
    }

    /// Output path without extension
    pub fn output_base(&self) -> &Path {
        &self.output_base
    }

    /// Where the finished clip is expected to land
    pub fn output_path(&self) -> PathBuf {
        let mut path: OsString = self.output_base.as_os_str().to_owned();
        path.push(".");
        path.push(self.container.extension());
        PathBuf::from(path)
    }
}

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    Windows,
    Linux,
    MacOs,
    /// BSDs and other Unix-likes
    OtherUnix,
    Unknown,
}

impl HostOs {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            HostOs::Windows
        } else if cfg!(target_os = "macos") {
            HostOs::MacOs
        } else if cfg!(target_os = "linux") {
            HostOs::Linux
        } else if cfg!(unix) {
            HostOs::OtherUnix
        } else {
            HostOs::Unknown
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostOs::Windows => "Windows",
            HostOs::Linux => "Linux",
            HostOs::MacOs => "macOS",
            HostOs::OtherUnix => "Unix",
            HostOs::Unknown => "unknown OS",
        };
        f.write_str(name)
    }
}

/// GPU vendor relevant for encoder selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GpuVendor {
    None,
    #[serde(rename = "NVIDIA")]
    Nvidia,
    #[serde(rename = "AMD")]
    Amd,
    Intel,
}

impl fmt::Display for GpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GpuVendor::None => "none",
            GpuVendor::Nvidia => "NVIDIA",
            GpuVendor::Amd => "AMD",
            GpuVendor::Intel => "Intel",
        };
        f.write_str(name)
    }
}

/// What the GPU probe found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuInfo {
    pub vendor: GpuVendor,
    /// Adapter name as reported by the OS
    pub name: String,
    /// Encoder the vendor is usually driven with on this OS
    pub codec_id: Option<String>,
}

/// Transcoder flags for hardware accelerated re-encoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwarePlan {
    pub vendor: GpuVendor,
    pub codec_id: Option<String>,
    /// Placed before the transcoder input (decode hints, device binding)
    pub input_args: Vec<String>,
    /// Placed before the transcoder output (filters, encoder)
    pub output_args: Vec<String>,
}

impl HardwarePlan {
    /// Plain software encoding, nothing injected
    pub fn software() -> Self {
        Self {
            vendor: GpuVendor::None,
            codec_id: None,
            input_args: Vec::new(),
            output_args: Vec::new(),
        }
    }

    pub fn is_hardware(&self) -> bool {
        self.codec_id.is_some()
    }

    /// All flags in order: input side first, then output side
    pub fn extra_args(&self) -> Vec<String> {
        self.input_args
            .iter()
            .chain(self.output_args.iter())
            .cloned()
            .collect()
    }

    /// Whether the planned encoder can write into `container`
    pub fn is_compatible_with(&self, container: Container) -> bool {
        match &self.codec_id {
            Some(codec) if codec.starts_with("h264_") => container.accepts_h264(),
            _ => true,
        }
    }
}

impl Default for HardwarePlan {
    fn default() -> Self {
        Self::software()
    }
}

/// External programs the pipeline drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    /// yt-dlp
    Downloader,
    /// ffmpeg
    Transcoder,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::Downloader, Tool::Transcoder];

    /// Program name without platform suffix
    pub fn program(&self) -> &'static str {
        match self {
            Tool::Downloader => "yt-dlp",
            Tool::Transcoder => "ffmpeg",
        }
    }

    pub fn version_flag(&self) -> &'static str {
        match self {
            Tool::Downloader => "--version",
            Tool::Transcoder => "-version",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Resolved locations of the external programs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    pub downloader: PathBuf,
    pub transcoder: PathBuf,
}

impl ToolPaths {
    pub fn get(&self, tool: Tool) -> &Path {
        match tool {
            Tool::Downloader => &self.downloader,
            Tool::Transcoder => &self.transcoder,
        }
    }
}

/// Why a clip job failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The downloader exited with a non-zero status
    ToolExited { code: Option<i32> },
    /// Exit status was zero but the downloader printed errors
    ToolReportedError,
    /// The downloader binary could not be started
    MissingBinary,
    /// Any other I/O failure while running the job
    Io,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ToolExited { code: Some(code) } => {
                write!(f, "downloader exited with code {}", code)
            }
            FailureReason::ToolExited { code: None } => {
                write!(f, "downloader was terminated by a signal")
            }
            FailureReason::ToolReportedError => write!(f, "downloader reported an error"),
            FailureReason::MissingBinary => write!(f, "yt-dlp or ffmpeg not found"),
            FailureReason::Io => write!(f, "I/O error while running the downloader"),
        }
    }
}

/// Terminal result of one clip job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Success { output_path: PathBuf },
    Failure { reason: FailureReason, detail: String },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success { .. })
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Success { output_path } => {
                write!(f, "Clip saved to: {}", output_path.display())
            }
            JobOutcome::Failure { reason, detail } if detail.is_empty() => {
                write!(f, "Error during clipping process: {}", reason)
            }
            JobOutcome::Failure { reason, detail } => {
                write!(f, "Error during clipping process: {}\nDetails: {}", reason, detail)
            }
        }
    }
}

#[cfg(test)]
mod tests;
