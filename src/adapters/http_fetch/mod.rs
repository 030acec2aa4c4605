// HTTP artifact adapter - Downloads and unpacks yt-dlp/ffmpeg release builds

use async_trait::async_trait;
use futures::StreamExt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::{HostOs, Tool};
use crate::error::{ClipperError, ClipperResult};
use crate::ports::ArtifactSource;
use crate::utils::path::PathUtils;

const YTDLP_RELEASE_BASE: &str = "https://github.com/yt-dlp/yt-dlp/releases/latest/download";
const FFMPEG_RELEASE_BASE: &str = "https://github.com/BtbN/FFmpeg-Builds/releases/download/latest";

/// How a release artifact is packaged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The download is the executable itself
    Binary,
    Zip,
    TarXz,
}

/// Where to get a tool for a platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseArtifact {
    pub url: String,
    pub kind: ArtifactKind,
}

impl ReleaseArtifact {
    /// Release artifact for `tool` on `os`
    pub fn for_tool(tool: Tool, os: HostOs) -> Result<Self, DomainError> {
        let artifact = match (tool, os) {
            (Tool::Downloader, HostOs::Windows) => Self::binary(YTDLP_RELEASE_BASE, "yt-dlp.exe"),
            (Tool::Downloader, HostOs::MacOs) => Self::binary(YTDLP_RELEASE_BASE, "yt-dlp_macos"),
            (Tool::Downloader, _) => Self::binary(YTDLP_RELEASE_BASE, "yt-dlp"),
            (Tool::Transcoder, HostOs::Windows) => Self {
                url: format!("{}/ffmpeg-master-latest-win64-gpl.zip", FFMPEG_RELEASE_BASE),
                kind: ArtifactKind::Zip,
            },
            (Tool::Transcoder, HostOs::Linux) => {
                let arch = if cfg!(target_arch = "aarch64") {
                    "linuxarm64"
                } else {
                    "linux64"
                };
                Self {
                    url: format!(
                        "{}/ffmpeg-master-latest-{}-gpl.tar.xz",
                        FFMPEG_RELEASE_BASE, arch
                    ),
                    kind: ArtifactKind::TarXz,
                }
            }
            (Tool::Transcoder, HostOs::MacOs) => {
                return Err(DomainError::DependencyMissing(
                    "ffmpeg is not downloaded automatically on macOS; install it with `brew install ffmpeg`"
                        .to_string(),
                ))
            }
            (Tool::Transcoder, _) => {
                return Err(DomainError::DependencyMissing(
                    "no ffmpeg build is published for this platform; install ffmpeg with your package manager"
                        .to_string(),
                ))
            }
        };
        Ok(artifact)
    }

    fn binary(base: &str, file: &str) -> Self {
        Self {
            url: format!("{}/{}", base, file),
            kind: ArtifactKind::Binary,
        }
    }
}

/// Executables to pull out of a transcoder archive
fn transcoder_members() -> Vec<String> {
    let utils = PathUtils::new();
    vec![utils.executable_name("ffmpeg"), utils.executable_name("ffprobe")]
}

/// Extract the entries whose base name is in `members` into `dest_dir`.
///
/// Directory structure inside the archive is ignored. Returns the names
/// that were written.
pub fn extract_members(
    archive: &Path,
    kind: ArtifactKind,
    dest_dir: &Path,
    members: &[String],
) -> ClipperResult<Vec<String>> {
    let utils = PathUtils::new();
    let mut extracted = Vec::new();
    let file = File::open(archive)?;

    match kind {
        ArtifactKind::Binary => {
            return Err(ClipperError::ArchiveError {
                message: "a plain binary has no members".to_string(),
            })
        }
        ArtifactKind::Zip => {
            let mut zip = zip::ZipArchive::new(file)?;
            for i in 0..zip.len() {
                let mut entry = zip.by_index(i)?;
                if entry.is_dir() {
                    continue;
                }
                let name = entry.name().to_string();
                let Some(base) = utils.member_basename(&name) else {
                    continue;
                };
                if members.iter().any(|m| m == base) && !extracted.iter().any(|e| e == base) {
                    let mut out = File::create(dest_dir.join(base))?;
                    io::copy(&mut entry, &mut out)?;
                    debug!("Extracted {} from {}", base, name);
                    extracted.push(base.to_string());
                }
            }
        }
        ArtifactKind::TarXz => {
            let mut tar = tar::Archive::new(xz2::read::XzDecoder::new(file));
            for entry in tar.entries()? {
                let mut entry = entry?;
                if !entry.header().entry_type().is_file() {
                    continue;
                }
                let base = {
                    let path = entry.path()?;
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| n.to_string())
                };
                let Some(base) = base else {
                    continue;
                };
                if members.contains(&base) && !extracted.contains(&base) {
                    let mut out = File::create(dest_dir.join(&base))?;
                    io::copy(&mut entry, &mut out)?;
                    debug!("Extracted {}", base);
                    extracted.push(base);
                }
            }
        }
    }

    Ok(extracted)
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Fetches release builds over HTTPS
pub struct HttpArtifactSource {
    client: reqwest::Client,
    os: HostOs,
}

impl HttpArtifactSource {
    /// Create a source; `timeout` bounds each whole download
    pub fn new(timeout: Option<Duration>) -> Result<Self, DomainError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("kayclipper/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ClipperError::from)?;

        Ok(Self {
            client,
            os: HostOs::current(),
        })
    }

    /// Stream `url` into a temporary file inside `dest_dir`
    async fn download(&self, url: &str, dest_dir: &Path) -> ClipperResult<TempPath> {
        info!("Downloading {}", url);
        let response = self.client.get(url).send().await?;
        check_status(url, response.status())?;

        let (file, path) = tempfile::Builder::new()
            .prefix(".kayclipper-")
            .suffix(".part")
            .tempfile_in(dest_dir)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut received: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            received += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        debug!("Received {} bytes from {}", received, url);
        Ok(path)
    }

    async fn install(
        &self,
        tool: Tool,
        artifact: &ReleaseArtifact,
        dest_dir: &Path,
    ) -> ClipperResult<PathBuf> {
        let target = dest_dir.join(PathUtils::new().executable_name(tool.program()));
        let download = self.download(&artifact.url, dest_dir).await?;

        match artifact.kind {
            ArtifactKind::Binary => {
                download.persist(&target).map_err(io::Error::from)?;
            }
            kind => {
                let archive = download.to_path_buf();
                let dest = dest_dir.to_path_buf();
                let members = transcoder_members();
                let extracted = tokio::task::spawn_blocking(move || {
                    extract_members(&archive, kind, &dest, &members)
                })
                .await??;
                drop(download);

                let expected = PathUtils::new().executable_name(tool.program());
                if !extracted.contains(&expected) {
                    return Err(ClipperError::ArchiveError {
                        message: format!("{} not found inside {}", expected, artifact.url),
                    });
                }
                for name in &extracted {
                    make_executable(&dest_dir.join(name)).await?;
                }
            }
        }

        make_executable(&target).await?;
        Ok(target)
    }
}

#[async_trait]
impl ArtifactSource for HttpArtifactSource {
    async fn fetch(&self, tool: Tool, dest_dir: &Path) -> Result<PathBuf, DomainError> {
        let artifact = ReleaseArtifact::for_tool(tool, self.os)?;
        let target = self.install(tool, &artifact, dest_dir).await?;
        info!("{} installed to {}", tool, target.display());
        Ok(target)
    }
}

/// Reject anything but a 2xx answer from the release server
fn check_status(url: &str, status: reqwest::StatusCode) -> ClipperResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ClipperError::DownloadError {
            message: format!("{} answered HTTP {}", url, status),
        })
    }
}
