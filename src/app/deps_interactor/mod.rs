// Dependency interactor - Checks and installs yt-dlp/ffmpeg

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::app::session::{ActionKind, SessionContext};
use crate::domain::errors::DomainError;
use crate::domain::model::{Tool, ToolPaths};
use crate::ports::DependencyPort;

/// Where a tool was found, if anywhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyStatus {
    pub tool: Tool,
    pub path: Option<PathBuf>,
}

impl DependencyStatus {
    pub fn is_present(&self) -> bool {
        self.path.is_some()
    }
}

/// Interactor for the dependency check use case
pub struct DependencyInteractor {
    session: Arc<SessionContext>,
    dependencies: Arc<dyn DependencyPort>,
}

impl DependencyInteractor {
    pub fn new(session: Arc<SessionContext>, dependencies: Arc<dyn DependencyPort>) -> Self {
        Self {
            session,
            dependencies,
        }
    }

    /// Look for every tool without downloading anything
    pub async fn status(&self) -> Result<Vec<DependencyStatus>, DomainError> {
        let _permit = self
            .session
            .flights()
            .try_acquire(ActionKind::DependencyCheck)?;

        let mut statuses = Vec::with_capacity(Tool::ALL.len());
        for tool in Tool::ALL {
            let path = self.dependencies.locate(tool).await;
            statuses.push(DependencyStatus { tool, path });
        }
        Ok(statuses)
    }

    /// Make sure every tool is available, fetching what is missing
    pub async fn ensure(&self) -> Result<ToolPaths, DomainError> {
        let _permit = self
            .session
            .flights()
            .try_acquire(ActionKind::DependencyCheck)?;

        let tools = self
            .session
            .tool_paths(self.dependencies.as_ref())
            .await?
            .clone();
        info!(
            "Dependencies ready: yt-dlp at {}, ffmpeg at {}",
            tools.downloader.display(),
            tools.transcoder.display()
        );
        Ok(tools)
    }
}
