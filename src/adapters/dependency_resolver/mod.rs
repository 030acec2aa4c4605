// Dependency resolver adapter - Finds or fetches yt-dlp and ffmpeg

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::{Tool, ToolPaths};
use crate::ports::{ArtifactSource, DependencyPort, DownloadConsent, ProcessRunner};
use crate::utils::path::PathUtils;

/// Resolves tools from the managed directory, then the system path, then
/// by downloading them into the managed directory.
pub struct DependencyResolver {
    bin_dir: PathBuf,
    /// Overrides `PATH` for lookups
    search_path: Option<OsString>,
    runner: Arc<dyn ProcessRunner>,
    source: Arc<dyn ArtifactSource>,
    consent: Arc<dyn DownloadConsent>,
}

impl DependencyResolver {
    pub fn new(
        bin_dir: impl Into<PathBuf>,
        runner: Arc<dyn ProcessRunner>,
        source: Arc<dyn ArtifactSource>,
        consent: Arc<dyn DownloadConsent>,
    ) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            search_path: None,
            runner,
            source,
            consent,
        }
    }

    /// Search these directories instead of the process `PATH`
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Managed location of a tool
    pub fn local_path(&self, tool: Tool) -> PathBuf {
        self.bin_dir
            .join(PathUtils::new().executable_name(tool.program()))
    }

    fn find_on_path(&self, tool: Tool) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => which::which_in(tool.program(), Some(paths), "."),
            None => which::which(tool.program()),
        };
        match found {
            Ok(path) => Some(path),
            Err(e) => {
                debug!("{} not on the search path: {}", tool, e);
                None
            }
        }
    }

    /// Both tools, fetching whatever is missing
    pub async fn resolve_all(&self) -> Result<ToolPaths, DomainError> {
        Ok(ToolPaths {
            downloader: self.ensure_present(Tool::Downloader).await?,
            transcoder: self.ensure_present(Tool::Transcoder).await?,
        })
    }
}

#[async_trait]
impl DependencyPort for DependencyResolver {
    async fn locate(&self, tool: Tool) -> Option<PathBuf> {
        let local = self.local_path(tool);
        if local.is_file() {
            if self.runner.responds_to(&local, tool.version_flag()).await {
                debug!("Using managed {} at {}", tool, local.display());
                return Some(local);
            }
            warn!("{} exists but does not run, ignoring it", local.display());
        }

        let system = self.find_on_path(tool)?;
        if self.runner.responds_to(&system, tool.version_flag()).await {
            debug!("Using system {} at {}", tool, system.display());
            Some(system)
        } else {
            warn!("{} found on PATH but does not run", system.display());
            None
        }
    }

    async fn ensure_present(&self, tool: Tool) -> Result<PathBuf, DomainError> {
        if let Some(path) = self.locate(tool).await {
            return Ok(path);
        }

        info!("{} not found in {} or on PATH", tool, self.bin_dir.display());
        if !self.consent.approve(tool).await {
            return Err(DomainError::DependencyMissing(format!(
                "{} is required and was not downloaded",
                tool
            )));
        }

        tokio::fs::create_dir_all(&self.bin_dir).await.map_err(|e| {
            DomainError::DependencyMissing(format!(
                "Cannot create {}: {}",
                self.bin_dir.display(),
                e
            ))
        })?;

        let path = self.source.fetch(tool, &self.bin_dir).await?;
        if self.runner.responds_to(&path, tool.version_flag()).await {
            info!("{} is ready at {}", tool, path.display());
            Ok(path)
        } else {
            Err(DomainError::DependencyMissing(format!(
                "Downloaded {} at {} does not run",
                tool,
                path.display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{ExitReport, FixedConsent, Invocation, ToolLine};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use tokio::sync::mpsc::UnboundedSender;

    /// Treats every existing file as a working binary
    struct ExistingFileRunner;

    #[async_trait]
    impl ProcessRunner for ExistingFileRunner {
        async fn run(
            &self,
            _invocation: &Invocation,
            _lines: UnboundedSender<ToolLine>,
        ) -> io::Result<ExitReport> {
            Ok(ExitReport {
                success: true,
                code: Some(0),
            })
        }

        async fn responds_to(&self, program: &Path, _flag: &str) -> bool {
            program.is_file()
        }
    }

    /// Writes a placeholder executable
    #[derive(Default)]
    struct FakeSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ArtifactSource for FakeSource {
        async fn fetch(&self, tool: Tool, dest_dir: &Path) -> Result<PathBuf, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let path = dest_dir.join(PathUtils::new().executable_name(tool.program()));
            std::fs::write(&path, b"binary").unwrap();
            Ok(path)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ArtifactSource for FailingSource {
        async fn fetch(&self, _tool: Tool, _dest_dir: &Path) -> Result<PathBuf, DomainError> {
            Err(DomainError::NetworkFailure("connection reset".to_string()))
        }
    }

    fn resolver(
        root: &TempDir,
        source: Arc<dyn ArtifactSource>,
        consent: bool,
    ) -> DependencyResolver {
        let empty_path = root.path().join("path");
        std::fs::create_dir_all(&empty_path).unwrap();
        DependencyResolver::new(
            root.path().join("bin"),
            Arc::new(ExistingFileRunner),
            source,
            Arc::new(FixedConsent(consent)),
        )
        .with_search_path(empty_path.into_os_string())
    }

    #[tokio::test]
    async fn test_missing_everywhere_fetches_into_bin_dir() {
        let root = TempDir::new().unwrap();
        let source = Arc::new(FakeSource::default());
        let resolver = resolver(&root, source.clone(), true);

        assert_eq!(resolver.locate(Tool::Transcoder).await, None);
        let path = resolver.ensure_present(Tool::Transcoder).await.unwrap();

        assert_eq!(path, resolver.local_path(Tool::Transcoder));
        assert!(path.is_file());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        // Second lookup is served from the managed directory
        resolver.ensure_present(Tool::Transcoder).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_declined_download_is_dependency_missing() {
        let root = TempDir::new().unwrap();
        let source = Arc::new(FakeSource::default());
        let resolver = resolver(&root, source.clone(), false);

        let err = resolver.ensure_present(Tool::Downloader).await.unwrap_err();
        assert!(matches!(err, DomainError::DependencyMissing(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert!(!resolver.bin_dir().exists());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_propagated() {
        let root = TempDir::new().unwrap();
        let resolver = resolver(&root, Arc::new(FailingSource), true);
        let err = resolver.ensure_present(Tool::Downloader).await.unwrap_err();
        assert!(matches!(err, DomainError::NetworkFailure(_)));
    }

    #[tokio::test]
    async fn test_system_path_is_used() {
        let root = TempDir::new().unwrap();
        let system_dir = root.path().join("system");
        std::fs::create_dir_all(&system_dir).unwrap();
        let system_tool = system_dir.join(PathUtils::new().executable_name("yt-dlp"));
        std::fs::write(&system_tool, b"binary").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&system_tool, std::fs::Permissions::from_mode(0o755))
                .unwrap();
        }

        let source = Arc::new(FakeSource::default());
        let resolver = DependencyResolver::new(
            root.path().join("bin"),
            Arc::new(ExistingFileRunner),
            source.clone(),
            Arc::new(FixedConsent(true)),
        )
        .with_search_path(system_dir.clone().into_os_string());

        let path = resolver.ensure_present(Tool::Downloader).await.unwrap();
        assert_eq!(path, system_tool);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_all() {
        let root = TempDir::new().unwrap();
        let resolver = resolver(&root, Arc::new(FakeSource::default()), true);
        let tools = resolver.resolve_all().await.unwrap();
        assert_eq!(tools.downloader, resolver.local_path(Tool::Downloader));
        assert_eq!(tools.transcoder, resolver.local_path(Tool::Transcoder));
    }
}
