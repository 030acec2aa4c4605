//! Command-line argument definitions

use clap::Args;

/// Arguments for the clip command
#[derive(Args, Debug)]
pub struct ClipArgs {
    /// Video page URL
    #[arg(short, long)]
    pub url: Option<String>,

    /// Start time (HH:MM:SS, MM:SS, or seconds); empty means from the beginning
    #[arg(short, long, default_value = "")]
    pub start: String,

    /// End time (HH:MM:SS, MM:SS, or seconds); empty means to the end
    #[arg(short, long, default_value = "")]
    pub end: String,

    /// Output container (mp4, webm, mkv, mp3, wav, aac)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Maximum video quality (Best, 1080p, 720p, 480p, 360p)
    #[arg(short, long)]
    pub quality: Option<String>,

    /// Output file; any extension is replaced by the container's
    #[arg(short, long)]
    pub output: Option<String>,

    /// Download missing yt-dlp/ffmpeg without asking
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Encode in software even when a GPU is available
    #[arg(long)]
    pub no_hwaccel: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the deps command
#[derive(Args, Debug)]
pub struct DepsArgs {
    /// Download missing tools without asking
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
