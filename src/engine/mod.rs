//! Core clipping engine module
//!
//! Turns a validated [`ClipRequest`](crate::domain::model::ClipRequest) into a
//! single downloader invocation, watches its output and classifies the result.

pub mod clipper;
pub mod command;
pub mod progress;

pub use clipper::ExecutionEngine;
pub use command::{DownloadJob, PostProcess};
pub use progress::{
    ChannelProgressSink, JobStatus, NullProgressSink, ProgressEvent, ProgressRelay, ProgressSink,
};
