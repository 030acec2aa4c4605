//! KayClipper Library
//!
//! Clips a time range out of an online video: yt-dlp fetches and cuts the
//! section, ffmpeg re-encodes it, on the GPU when the host has one.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::{DomainError, ValidationError};
pub use domain::model::{
    ClipRequest, Container, FailureReason, GpuInfo, GpuVendor, HardwarePlan, HostOs, JobOutcome,
    Quality, TimeSpec, TimeWindow, Tool, ToolPaths,
};
pub use domain::rules::{ClipRequestBuilder, RawClipForm};
pub use error::{ClipperError, ClipperResult};
