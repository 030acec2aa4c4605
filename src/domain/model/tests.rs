// Unit tests for domain models

use super::*;
use crate::domain::errors::ValidationError;

#[test]
fn test_time_spec_parse() {
    assert_eq!(TimeSpec::parse("1:02:03").unwrap(), Some(TimeSpec::from_seconds(3723.0)));
    assert_eq!(TimeSpec::parse("90").unwrap(), Some(TimeSpec::from_seconds(90.0)));
    assert_eq!(TimeSpec::parse("").unwrap(), None);
    assert!(TimeSpec::parse("ten").is_err());
}

#[test]
fn test_time_spec_display() {
    let time = TimeSpec::from_seconds(3723.456);
    assert_eq!(format!("{}", time), "1:02:03.456");
}

#[test]
fn test_time_window_rejects_inverted_range() {
    let start = Some(TimeSpec::from_seconds(20.0));
    let end = Some(TimeSpec::from_seconds(10.0));
    assert_eq!(
        TimeWindow::new(start, end),
        Err(ValidationError::StartNotBeforeEnd {
            start: 20.0,
            end: 10.0
        })
    );

    let same = Some(TimeSpec::from_seconds(10.0));
    assert!(TimeWindow::new(same, same).is_err());
}

#[test]
fn test_time_window_rejects_nan_bound() {
    let nan = Some(TimeSpec::from_seconds(f64::NAN));
    let ten = Some(TimeSpec::from_seconds(10.0));
    assert!(TimeWindow::new(nan, ten).is_err());
    assert!(TimeWindow::new(ten, nan).is_err());
}

#[test]
fn test_time_window_download_section() {
    let window = TimeWindow::new(
        Some(TimeSpec::from_seconds(10.0)),
        Some(TimeSpec::from_seconds(20.5)),
    )
    .unwrap();
    assert_eq!(window.download_section().as_deref(), Some("*10-20.5"));
    assert_eq!(window.span_seconds(), Some(10.5));

    let open_start = TimeWindow::new(None, Some(TimeSpec::from_seconds(30.0))).unwrap();
    assert_eq!(open_start.download_section().as_deref(), Some("*0-30"));

    let open_end = TimeWindow::new(Some(TimeSpec::from_seconds(5.0)), None).unwrap();
    assert_eq!(open_end.download_section().as_deref(), Some("*5-inf"));
    assert_eq!(open_end.span_seconds(), None);

    assert_eq!(TimeWindow::full().download_section(), None);
}

#[test]
fn test_container_parse_and_kind() {
    assert_eq!("MP4".parse::<Container>().unwrap(), Container::Mp4);
    assert_eq!(".mkv".parse::<Container>().unwrap(), Container::Mkv);
    assert!("avi".parse::<Container>().is_err());

    let audio: Vec<_> = Container::ALL.iter().filter(|c| c.is_audio_only()).collect();
    assert_eq!(audio, vec![&Container::Mp3, &Container::Wav, &Container::Aac]);
    assert!(!Container::Webm.accepts_h264());
}

#[test]
fn test_quality_parse() {
    assert_eq!("Best".parse::<Quality>().unwrap(), Quality::Best);
    assert_eq!("720p".parse::<Quality>().unwrap(), Quality::P720);
    assert_eq!("1080".parse::<Quality>().unwrap(), Quality::P1080);
    assert!("4k".parse::<Quality>().is_err());
    assert_eq!(Quality::P480.to_string(), "480p");
}

#[test]
fn test_clip_request_output_path_keeps_inner_dots() {
    let request = ClipRequest::new(
        "https://example/video",
        TimeWindow::full(),
        Container::Mp4,
        Quality::Best,
        "clips/my.video",
    )
    .unwrap();
    assert_eq!(request.output_path(), PathBuf::from("clips/my.video.mp4"));
}

#[test]
fn test_clip_request_requires_url_and_output() {
    assert_eq!(
        ClipRequest::new("  ", TimeWindow::full(), Container::Mp4, Quality::Best, "out"),
        Err(ValidationError::MissingUrl)
    );
    assert_eq!(
        ClipRequest::new("https://x", TimeWindow::full(), Container::Mp4, Quality::Best, ""),
        Err(ValidationError::MissingOutputPath)
    );
}

#[test]
fn test_hardware_plan_extra_args_order() {
    let plan = HardwarePlan {
        vendor: GpuVendor::Nvidia,
        codec_id: Some("h264_nvenc".to_string()),
        input_args: vec!["-hwaccel".to_string(), "cuda".to_string()],
        output_args: vec!["-c:v".to_string(), "h264_nvenc".to_string()],
    };
    assert_eq!(plan.extra_args(), vec!["-hwaccel", "cuda", "-c:v", "h264_nvenc"]);
    assert!(plan.is_hardware());
    assert!(plan.is_compatible_with(Container::Mkv));
    assert!(!plan.is_compatible_with(Container::Webm));
    assert!(HardwarePlan::software().is_compatible_with(Container::Webm));
}

#[test]
fn test_job_outcome_serializes_with_status_tag() {
    let outcome = JobOutcome::Failure {
        reason: FailureReason::ToolExited { code: Some(1) },
        detail: "ERROR: Unsupported URL".to_string(),
    };
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "failure");
    assert_eq!(json["reason"]["kind"], "tool_exited");
    assert_eq!(json["reason"]["code"], 1);
}
