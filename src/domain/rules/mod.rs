// Domain rules - Request validation and downloader format policy

use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;
use crate::domain::model::*;
use crate::utils::path::PathUtils;

/// Format selector used for every audio-only container
pub const AUDIO_FORMAT_SELECTOR: &str = "bestaudio/best";

/// Maps container and quality to a downloader format selector
pub struct FormatSelectorRule;

impl FormatSelectorRule {
    /// Best audio track for audio containers; otherwise the best MP4 video
    /// under the quality's height cap plus the best M4A audio, falling back
    /// to the best single MP4 file and finally to anything.
    pub fn select(container: Container, quality: Quality) -> String {
        if container.is_audio_only() {
            return AUDIO_FORMAT_SELECTOR.to_string();
        }

        let height_filter = quality
            .max_height()
            .map(|height| format!("[height<={}]", height))
            .unwrap_or_default();

        format!(
            "bestvideo{}[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
            height_filter
        )
    }
}

/// Raw field values as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawClipForm {
    pub url: String,
    pub start: String,
    pub end: String,
    pub format: String,
    pub quality: String,
    pub output: String,
}

/// Turns a [`RawClipForm`] into a validated [`ClipRequest`]
pub struct ClipRequestBuilder;

impl ClipRequestBuilder {
    /// Validate the form.
    ///
    /// Checks run in a fixed order so the first problem reported is stable:
    /// URL, output path, format, quality (video only), start, end, range.
    pub fn build(form: &RawClipForm) -> Result<ClipRequest, ValidationError> {
        let url = form.url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        let output_base = PathUtils::new()
            .output_base(&form.output)
            .ok_or(ValidationError::MissingOutputPath)?;

        let container: Container = form.format.parse()?;
        let quality = if container.is_audio_only() {
            Quality::Best
        } else {
            form.quality.parse()?
        };

        let start = TimeSpec::parse(&form.start)
            .map_err(|_| ValidationError::InvalidStartTime(form.start.trim().to_string()))?;
        let end = TimeSpec::parse(&form.end)
            .map_err(|_| ValidationError::InvalidEndTime(form.end.trim().to_string()))?;
        let window = TimeWindow::new(start, end)?;

        ClipRequest::new(url, window, container, quality, output_base)
    }

    /// Format selector for an already validated request
    pub fn format_selector(request: &ClipRequest) -> String {
        FormatSelectorRule::select(request.container(), request.quality())
    }

    /// Downloader output template for an already validated request
    pub fn output_template(request: &ClipRequest) -> String {
        PathUtils::new().output_template(request.output_base())
    }
}
