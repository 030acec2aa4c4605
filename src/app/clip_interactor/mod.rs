// Clip interactor - Orchestrates the clip use case

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::session::{ActionKind, SessionContext};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{ExecutionEngine, ProgressSink};
use crate::ports::*;

/// How hardware acceleration is chosen for a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelerationPolicy {
    /// Allow GPU encoders at all
    pub enabled: bool,
    /// Wait for the GPU probe when it has not finished yet
    pub wait_for_probe: bool,
}

impl Default for AccelerationPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            wait_for_probe: true,
        }
    }
}

/// Result of one clip action
#[derive(Debug, Clone, Serialize)]
pub struct ClipReport {
    pub request: ClipRequest,
    pub hardware: HardwarePlan,
    pub outcome: JobOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ClipReport {
    pub fn elapsed_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Interactor for the clip use case
pub struct ClipInteractor {
    session: Arc<SessionContext>,
    dependencies: Arc<dyn DependencyPort>,
    engine: ExecutionEngine,
    acceleration: AccelerationPolicy,
}

impl ClipInteractor {
    pub fn new(
        session: Arc<SessionContext>,
        dependencies: Arc<dyn DependencyPort>,
        runner: Arc<dyn ProcessRunner>,
        acceleration: AccelerationPolicy,
    ) -> Self {
        Self {
            session,
            dependencies,
            engine: ExecutionEngine::new(runner),
            acceleration,
        }
    }

    /// Validate the form, make sure the tools exist, then run the clip.
    ///
    /// Validation and dependency problems are errors; a clip that ran and
    /// failed is a report with a failure outcome.
    pub async fn execute(
        &self,
        form: &RawClipForm,
        sink: &dyn ProgressSink,
    ) -> Result<ClipReport, DomainError> {
        let _permit = self.session.flights().try_acquire(ActionKind::Clip)?;

        let request = ClipRequestBuilder::build(form)?;
        info!(
            "Clip request: {} as {} ({})",
            request.source_url(),
            request.container(),
            request.quality()
        );

        let tools = self
            .session
            .tool_paths(self.dependencies.as_ref())
            .await?
            .clone();
        let hardware = self.select_plan(&request).await;

        let started_at = Utc::now();
        let outcome = self
            .engine
            .execute(&request, &hardware, &tools, sink)
            .await;
        let finished_at = Utc::now();

        Ok(ClipReport {
            request,
            hardware,
            outcome,
            started_at,
            finished_at,
        })
    }

    async fn select_plan(&self, request: &ClipRequest) -> HardwarePlan {
        if request.is_audio_only() {
            return HardwarePlan::software();
        }
        if !self.acceleration.enabled {
            info!("Hardware acceleration disabled, encoding in software");
            return HardwarePlan::software();
        }

        let plan = if self.acceleration.wait_for_probe {
            Some(self.session.hardware_plan().await.clone())
        } else {
            self.session.hardware_snapshot().cloned()
        };

        match plan {
            Some(plan) if plan.is_hardware() => plan,
            Some(_) => {
                warn!("No usable GPU encoder detected; this clip will be encoded on the CPU");
                HardwarePlan::software()
            }
            None => {
                warn!("GPU probe still running; this clip will be encoded on the CPU");
                HardwarePlan::software()
            }
        }
    }
}
