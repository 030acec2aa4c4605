//! Time parsing and formatting utilities

use crate::error::{ClipperError, ClipperResult};

/// Time parser for the clip range fields
pub struct TimeParser;

impl TimeParser {
    /// Create a new time parser
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeParser {
    /// Parse a time field to seconds.
    ///
    /// Returns `Ok(None)` for an empty field, which means "unset" and is
    /// distinct from a malformed value. Accepts `HH:MM:SS`, `MM:SS` or bare
    /// seconds; colon fields are weighted right to left by powers of 60 so
    /// any number of fields is accepted. Values are not range checked.
    pub fn parse_time(&self, time_str: &str) -> ClipperResult<Option<f64>> {
        let time_str = time_str.trim();
        if time_str.is_empty() {
            return Ok(None);
        }

        let seconds = if time_str.contains(':') {
            self.parse_colon_fields(time_str)?
        } else {
            Self::parse_field(time_str, time_str)?
        };

        Ok(Some(seconds))
    }

    /// Sum `:`-separated fields right to left; the total must stay finite
    fn parse_colon_fields(&self, time_str: &str) -> ClipperResult<f64> {
        let total = time_str
            .split(':')
            .rev()
            .enumerate()
            .try_fold(0.0, |total, (index, field)| {
                let value = Self::parse_field(field, time_str)?;
                Ok::<f64, ClipperError>(total + value * 60f64.powi(index as i32))
            })?;
        if total.is_finite() {
            Ok(total)
        } else {
            Err(ClipperError::InvalidTimeFormat {
                time: time_str.to_string(),
            })
        }
    }

    fn parse_field(field: &str, original: &str) -> ClipperResult<f64> {
        field
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ClipperError::InvalidTimeFormat {
                time: original.to_string(),
            })
    }

    /// Format seconds to H:MM:SS.mmm (or MM:SS.mmm under an hour)
    pub fn format_time(&self, seconds: f64) -> String {
        let sign = if seconds < 0.0 { "-" } else { "" };
        let total_ms = (seconds.abs() * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let secs = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;

        if hours > 0 {
            format!(
                "{}{}:{:02}:{:02}.{:03}",
                sign, hours, minutes, secs, milliseconds
            )
        } else {
            format!("{}{:02}:{:02}.{:03}", sign, minutes, secs, milliseconds)
        }
    }

    /// Compact seconds form used in downloader section strings (`10`, `10.5`)
    pub fn format_seconds(&self, seconds: f64) -> String {
        format!("{}", seconds)
    }
}
