//! Downloader job description and argument vector construction

use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

use crate::domain::model::{ClipRequest, Container, HardwarePlan, ToolPaths};
use crate::domain::rules::ClipRequestBuilder;
use crate::utils::path::PathUtils;

/// Post-processor that runs after the download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PostProcess {
    /// Extract the audio track into an audio container
    ExtractAudio { format: Container },
    /// Re-encode the video into the requested container
    Recode { format: Container },
}

/// Everything the downloader needs for one clip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadJob {
    pub source_url: String,
    pub format_selector: String,
    pub output_template: String,
    /// `*start-end` section restriction, if any
    pub download_section: Option<String>,
    /// Re-encode around cut points so the clip starts on a keyframe
    pub force_keyframes_at_cuts: bool,
    pub post_process: PostProcess,
    /// Transcoder args placed before its input during the re-encode step
    pub postprocessor_input_args: Vec<String>,
    /// Transcoder args placed before its output during the re-encode step
    pub postprocessor_output_args: Vec<String>,
    /// Transcoder location handed to the downloader
    pub ffmpeg_location: Option<PathBuf>,
}

impl DownloadJob {
    /// Assemble the job for a validated request.
    ///
    /// Hardware flags only ever attach to the re-encode step. A plan whose
    /// encoder cannot write the requested container is dropped in favour of
    /// software encoding.
    pub fn from_request(request: &ClipRequest, plan: &HardwarePlan, tools: &ToolPaths) -> Self {
        let container = request.container();
        let post_process = if request.is_audio_only() {
            PostProcess::ExtractAudio { format: container }
        } else {
            PostProcess::Recode { format: container }
        };

        let (input_args, output_args) = match post_process {
            PostProcess::Recode { .. } if plan.is_compatible_with(container) => {
                (plan.input_args.clone(), plan.output_args.clone())
            }
            PostProcess::Recode { .. } => {
                warn!(
                    "{} encoder cannot write {}, falling back to software encoding",
                    plan.codec_id.as_deref().unwrap_or("hardware"),
                    container
                );
                (Vec::new(), Vec::new())
            }
            PostProcess::ExtractAudio { .. } => (Vec::new(), Vec::new()),
        };

        let download_section = request.window().download_section();
        let ffmpeg_location = Some(tools.transcoder.clone())
            .filter(|path| !PathUtils::new().is_bare_program(path));

        Self {
            source_url: request.source_url().to_string(),
            format_selector: ClipRequestBuilder::format_selector(request),
            output_template: ClipRequestBuilder::output_template(request),
            force_keyframes_at_cuts: download_section.is_some(),
            download_section,
            post_process,
            postprocessor_input_args: input_args,
            postprocessor_output_args: output_args,
            ffmpeg_location,
        }
    }

    /// Whether hardware flags made it into the job
    pub fn uses_hardware(&self) -> bool {
        !self.postprocessor_input_args.is_empty() || !self.postprocessor_output_args.is_empty()
    }

    /// Command-line arguments for yt-dlp
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(location) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".to_string());
            args.push(location.to_string_lossy().to_string());
        }

        if let Some(section) = &self.download_section {
            args.push("--download-sections".to_string());
            args.push(section.clone());
        }
        if self.force_keyframes_at_cuts {
            args.push("--force-keyframes-at-cuts".to_string());
        }

        args.push("-f".to_string());
        args.push(self.format_selector.clone());

        match self.post_process {
            PostProcess::ExtractAudio { format } => {
                args.push("--extract-audio".to_string());
                args.push("--audio-format".to_string());
                args.push(format.extension().to_string());
            }
            PostProcess::Recode { format } => {
                args.push("--recode-video".to_string());
                args.push(format.extension().to_string());
                if !self.postprocessor_input_args.is_empty() {
                    args.push("--postprocessor-args".to_string());
                    args.push(format!(
                        "VideoConvertor+ffmpeg_i1:{}",
                        self.postprocessor_input_args.join(" ")
                    ));
                }
                if !self.postprocessor_output_args.is_empty() {
                    args.push("--postprocessor-args".to_string());
                    args.push(format!(
                        "VideoConvertor+ffmpeg_o:{}",
                        self.postprocessor_output_args.join(" ")
                    ));
                }
            }
        }

        args.extend(
            [
                "--no-playlist",
                "-o",
                self.output_template.as_str(),
                "--quiet",
                "--progress",
                "--newline",
                "--no-warnings",
                // URL may start with '-'; keep it out of option parsing
                "--",
                self.source_url.as_str(),
            ]
            .iter()
            .map(|s| s.to_string()),
        );

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::GpuVendor;
    use crate::domain::rules::{RawClipForm, AUDIO_FORMAT_SELECTOR};

    fn request(start: &str, end: &str, format: &str) -> ClipRequest {
        ClipRequestBuilder::build(&RawClipForm {
            url: "https://example/video".to_string(),
            start: start.to_string(),
            end: end.to_string(),
            format: format.to_string(),
            quality: "720p".to_string(),
            output: "out/clip.mp4".to_string(),
        })
        .unwrap()
    }

    fn tools() -> ToolPaths {
        ToolPaths {
            downloader: PathBuf::from("yt-dlp"),
            transcoder: PathBuf::from("bin/ffmpeg"),
        }
    }

    fn nvenc() -> HardwarePlan {
        HardwarePlan {
            vendor: GpuVendor::Nvidia,
            codec_id: Some("h264_nvenc".to_string()),
            input_args: vec!["-hwaccel".to_string(), "cuda".to_string()],
            output_args: vec!["-c:v".to_string(), "h264_nvenc".to_string()],
        }
    }

    #[test]
    fn test_video_job_with_window_and_hardware() {
        let job = DownloadJob::from_request(&request("0:10", "0:20", "mp4"), &nvenc(), &tools());
        assert_eq!(job.download_section.as_deref(), Some("*10-20"));
        assert!(job.force_keyframes_at_cuts);
        assert_eq!(job.post_process, PostProcess::Recode { format: Container::Mp4 });

        let args = job.to_args();
        let joined = args.join(" ");
        assert!(joined.contains("--download-sections *10-20 --force-keyframes-at-cuts"));
        assert!(joined.contains("--recode-video mp4"));
        assert!(args.contains(&"VideoConvertor+ffmpeg_i1:-hwaccel cuda".to_string()));
        assert!(args.contains(&"VideoConvertor+ffmpeg_o:-c:v h264_nvenc".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("https://example/video"));
        assert_eq!(&args[0..2], &["--ffmpeg-location".to_string(), "bin/ffmpeg".to_string()]);
    }

    #[test]
    fn test_full_video_has_no_section_flags() {
        let job = DownloadJob::from_request(&request("", "", "mkv"), &HardwarePlan::software(), &tools());
        let args = job.to_args();
        assert!(!args.contains(&"--download-sections".to_string()));
        assert!(!args.contains(&"--force-keyframes-at-cuts".to_string()));
        assert!(!args.contains(&"--postprocessor-args".to_string()));
    }

    #[test]
    fn test_audio_job_never_carries_hardware_flags() {
        let job = DownloadJob::from_request(&request("5", "", "mp3"), &nvenc(), &tools());
        assert_eq!(job.format_selector, AUDIO_FORMAT_SELECTOR);
        assert_eq!(job.post_process, PostProcess::ExtractAudio { format: Container::Mp3 });
        assert!(!job.uses_hardware());

        let joined = job.to_args().join(" ");
        assert!(joined.contains("--extract-audio --audio-format mp3"));
        assert!(joined.contains("--download-sections *5-inf"));
        assert!(!joined.contains("--recode-video"));
        assert!(!joined.contains("height<="));
    }

    #[test]
    fn test_webm_drops_h264_hardware_plan() {
        let job = DownloadJob::from_request(&request("", "", "webm"), &nvenc(), &tools());
        assert!(!job.uses_hardware());
    }

    #[test]
    fn test_bare_transcoder_is_not_passed() {
        let tools = ToolPaths {
            downloader: PathBuf::from("yt-dlp"),
            transcoder: PathBuf::from("ffmpeg"),
        };
        let job = DownloadJob::from_request(&request("", "", "mp4"), &HardwarePlan::software(), &tools);
        assert_eq!(job.ffmpeg_location, None);
        assert!(!job.to_args().contains(&"--ffmpeg-location".to_string()));
    }

    #[test]
    fn test_url_is_separated_from_options() {
        let request = ClipRequestBuilder::build(&RawClipForm {
            url: "--exec=touch /tmp/clip".to_string(),
            start: String::new(),
            end: String::new(),
            format: "mp4".to_string(),
            quality: "Best".to_string(),
            output: "out".to_string(),
        })
        .unwrap();
        let args = DownloadJob::from_request(&request, &HardwarePlan::software(), &tools()).to_args();

        let tail = &args[args.len() - 2..];
        assert_eq!(tail, &["--".to_string(), "--exec=touch /tmp/clip".to_string()]);
        assert_eq!(args.iter().filter(|a| a.starts_with("--exec")).count(), 1);
    }
}
