use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Binary isolated from the caller's config, managed tools and fetch policy
fn kayclipper(workdir: &Path, bin_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kayclipper").unwrap();
    cmd.current_dir(workdir)
        .env("KAYCLIPPER_BIN_DIR", bin_dir)
        .env("KAYCLIPPER_FETCH_POLICY", "never")
        .env("KAYCLIPPER_LOG_LEVEL", "warn")
        .env_remove("KAYCLIPPER_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn scratch() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let bin_dir = dir.path().join("bin");
    (dir, bin_dir)
}

#[test]
fn test_help_lists_commands() {
    let (dir, bin_dir) = scratch();
    kayclipper(dir.path(), &bin_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("clip"))
        .stdout(predicate::str::contains("deps"))
        .stdout(predicate::str::contains("probe"));
}

#[test]
fn test_clip_without_url_is_rejected() {
    let (dir, bin_dir) = scratch();
    kayclipper(dir.path(), &bin_dir)
        .args(["clip", "--output", "out.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please provide a video URL"));
    assert!(!bin_dir.exists());
}

#[test]
fn test_clip_without_output_is_rejected() {
    let (dir, bin_dir) = scratch();
    kayclipper(dir.path(), &bin_dir)
        .args(["clip", "--url", "https://example.com/watch?v=abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please provide an output file"));
}

#[test]
fn test_clip_with_reversed_range_is_rejected() {
    let (dir, bin_dir) = scratch();
    kayclipper(dir.path(), &bin_dir)
        .args([
            "clip",
            "--url",
            "https://example.com/watch?v=abc",
            "--start",
            "2:00",
            "--end",
            "1:00",
            "--output",
            "out.mp4",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be less than end time"));
    assert!(!bin_dir.exists());
}

#[test]
fn test_clip_with_bad_time_is_rejected() {
    let (dir, bin_dir) = scratch();
    kayclipper(dir.path(), &bin_dir)
        .args([
            "clip",
            "--url",
            "https://example.com/watch?v=abc",
            "--start",
            "abc",
            "--output",
            "out.mp4",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid start time format: 'abc'"));
}

#[test]
fn test_clip_with_unknown_format_is_rejected() {
    let (dir, bin_dir) = scratch();
    kayclipper(dir.path(), &bin_dir)
        .args([
            "clip",
            "--url",
            "https://example.com/watch?v=abc",
            "--format",
            "avi",
            "--output",
            "out",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported format: 'avi'"));
}

#[test]
fn test_missing_config_file_fails() {
    let (dir, bin_dir) = scratch();
    kayclipper(dir.path(), &bin_dir)
        .args(["--config", "nowhere.toml", "probe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file does not exist"));
}

#[test]
fn test_invalid_log_level_fails() {
    let (dir, bin_dir) = scratch();
    kayclipper(dir.path(), &bin_dir)
        .args(["--log-level", "loud", "probe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_config_file_default_format_is_validated() {
    let (dir, bin_dir) = scratch();
    std::fs::write(
        dir.path().join("kayclipper.toml"),
        "[clipper]\ndefault_format = \"avi\"\n",
    )
    .unwrap();
    kayclipper(dir.path(), &bin_dir)
        .arg("probe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("clipper.default_format"));
}

#[test]
fn test_probe_json_reports_os() {
    let (dir, bin_dir) = scratch();
    kayclipper(dir.path(), &bin_dir)
        .args(["probe", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"os\""))
        .stdout(predicate::str::contains("\"plan\""));
}

#[cfg(unix)]
mod with_stand_in_tools {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn install_script(dir: &Path, name: &str, body: &str) {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn install_tools(bin_dir: &Path, downloader_body: &str) {
        install_script(bin_dir, "ffmpeg", "exit 0");
        install_script(
            bin_dir,
            "yt-dlp",
            &format!(
                "if [ \"$1\" = \"--version\" ]; then echo 2024.01.01; exit 0; fi\n{}",
                downloader_body
            ),
        );
    }

    /// Empty search path so only the managed directory is considered
    fn isolated(workdir: &Path, bin_dir: &Path) -> Command {
        let mut cmd = kayclipper(workdir, bin_dir);
        cmd.env("PATH", workdir.join("empty-path"));
        cmd
    }

    #[test]
    fn test_deps_without_tools_and_fetch_disabled_fails() {
        let (dir, bin_dir) = scratch();
        isolated(dir.path(), &bin_dir)
            .arg("deps")
            .assert()
            .failure()
            .stderr(predicate::str::contains("was not downloaded"));
    }

    #[test]
    fn test_deps_finds_managed_tools() {
        let (dir, bin_dir) = scratch();
        install_tools(&bin_dir, "exit 0");
        isolated(dir.path(), &bin_dir)
            .args(["deps", "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"downloader\""))
            .stdout(predicate::str::contains(bin_dir.join("yt-dlp").to_str().unwrap()));
    }

    #[test]
    fn test_clip_runs_downloader() {
        let (dir, bin_dir) = scratch();
        install_tools(
            &bin_dir,
            "echo '[download]  50.0% of 10.00MiB'\necho '[download] 100.0% of 10.00MiB'\nexit 0",
        );
        isolated(dir.path(), &bin_dir)
            .args([
                "clip",
                "--url",
                "https://example.com/watch?v=abc",
                "--start",
                "10",
                "--end",
                "20",
                "--output",
                "clip.mkv",
                "--format",
                "mp4",
                "--no-hwaccel",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Clip saved to:"))
            .stdout(predicate::str::contains("clip.mp4"));
    }

    #[test]
    fn test_clip_json_report() {
        let (dir, bin_dir) = scratch();
        install_tools(&bin_dir, "exit 0");
        isolated(dir.path(), &bin_dir)
            .args([
                "clip",
                "--url",
                "https://example.com/watch?v=abc",
                "--format",
                "mp3",
                "--output",
                "song",
                "--json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"status\": \"success\""))
            .stdout(predicate::str::contains("song.mp3"));
    }

    #[test]
    fn test_clip_failure_shows_downloader_stderr() {
        let (dir, bin_dir) = scratch();
        install_tools(
            &bin_dir,
            "echo 'ERROR: [generic] Unsupported URL: https://example.com' >&2\nexit 1",
        );
        isolated(dir.path(), &bin_dir)
            .args([
                "clip",
                "--url",
                "https://example.com",
                "--output",
                "clip.mp4",
                "--no-hwaccel",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("downloader exited with code 1"))
            .stderr(predicate::str::contains("Unsupported URL"));
    }
}
