//! CLI module for KayClipper
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod args;
pub mod commands;
pub mod console;

pub use args::{ClipArgs, DepsArgs, ProbeArgs};

/// KayClipper
///
/// Cuts a time range out of an online video with yt-dlp and ffmpeg,
/// using the GPU encoder when one is available.
#[derive(Parser, Debug)]
#[command(name = "kayclipper")]
#[command(about = "KayClipper - clip a time range out of an online video")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./kayclipper.toml when present)
    #[arg(long, global = true, env = "KAYCLIPPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Directory for downloaded yt-dlp/ffmpeg binaries
    #[arg(long, global = true)]
    pub bin_dir: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a time range of a video into a local file
    Clip(ClipArgs),
    /// Check (and optionally fetch) yt-dlp and ffmpeg
    Deps(DepsArgs),
    /// Show the detected GPU and the encoder flags it leads to
    Probe(ProbeArgs),
}
