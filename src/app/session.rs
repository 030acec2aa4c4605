// Session context - Values shared by every action of one process

use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::{GpuInfo, HardwarePlan, HostOs, Tool, ToolPaths};
use crate::planner::HardwareAccelerationPlanner;
use crate::ports::{DependencyPort, GpuProbePort};

/// User-triggerable action categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    DependencyCheck,
    GpuProbe,
    Clip,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::DependencyCheck => "dependency check",
            ActionKind::GpuProbe => "GPU probe",
            ActionKind::Clip => "clip",
        };
        f.write_str(name)
    }
}

/// Held while an action runs; dropping it frees the slot
#[derive(Debug)]
pub struct ActionPermit {
    kind: ActionKind,
    _guard: OwnedMutexGuard<()>,
}

impl ActionPermit {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }
}

/// At most one running action per category; overlapping ones are rejected
#[derive(Debug, Default)]
pub struct SingleFlight {
    dependency_check: Arc<Mutex<()>>,
    gpu_probe: Arc<Mutex<()>>,
    clip: Arc<Mutex<()>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: ActionKind) -> &Arc<Mutex<()>> {
        match kind {
            ActionKind::DependencyCheck => &self.dependency_check,
            ActionKind::GpuProbe => &self.gpu_probe,
            ActionKind::Clip => &self.clip,
        }
    }

    /// Claim the slot for `kind` without waiting
    pub fn try_acquire(&self, kind: ActionKind) -> Result<ActionPermit, DomainError> {
        let guard = Arc::clone(self.slot(kind))
            .try_lock_owned()
            .map_err(|_| DomainError::Busy(format!("a {} is already running", kind)))?;
        debug!("Acquired {} slot", kind);
        Ok(ActionPermit {
            kind,
            _guard: guard,
        })
    }
}

/// Request context threaded through the interactors.
///
/// The GPU probe result, the video hardware plan and the tool paths are each
/// written once and read by every later action.
pub struct SessionContext {
    os: HostOs,
    probe: Arc<dyn GpuProbePort>,
    planner: HardwareAccelerationPlanner,
    gpu: OnceCell<Option<GpuInfo>>,
    plan: OnceCell<HardwarePlan>,
    tools: OnceCell<ToolPaths>,
    flights: SingleFlight,
}

impl SessionContext {
    pub fn new(
        os: HostOs,
        probe: Arc<dyn GpuProbePort>,
        planner: HardwareAccelerationPlanner,
    ) -> Self {
        Self {
            os,
            probe,
            planner,
            gpu: OnceCell::new(),
            plan: OnceCell::new(),
            tools: OnceCell::new(),
            flights: SingleFlight::new(),
        }
    }

    pub fn os(&self) -> HostOs {
        self.os
    }

    pub fn flights(&self) -> &SingleFlight {
        &self.flights
    }

    /// Probe result, detected on first use
    pub async fn gpu(&self) -> Option<&GpuInfo> {
        self.gpu
            .get_or_init(|| async { self.probe.detect(self.os).await })
            .await
            .as_ref()
    }

    /// Plan for video requests, computed on first use
    pub async fn hardware_plan(&self) -> &HardwarePlan {
        self.plan
            .get_or_init(|| async {
                let gpu = self.gpu().await;
                self.planner.plan_for(self.os, gpu, false)
            })
            .await
    }

    /// Plan if the probe already finished
    pub fn hardware_snapshot(&self) -> Option<&HardwarePlan> {
        self.plan.get()
    }

    /// Start probing in the background so a later clip does not wait
    pub fn spawn_hardware_probe(self: &Arc<Self>) -> JoinHandle<()> {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            let plan = session.hardware_plan().await;
            debug!("Background probe finished: {:?}", plan.codec_id);
        })
    }

    /// Tool paths, resolved (and fetched if needed) on first use
    pub async fn tool_paths(&self, deps: &dyn DependencyPort) -> Result<&ToolPaths, DomainError> {
        self.tools
            .get_or_try_init(|| async {
                Ok::<_, DomainError>(ToolPaths {
                    downloader: deps.ensure_present(Tool::Downloader).await?,
                    transcoder: deps.ensure_present(Tool::Transcoder).await?,
                })
            })
            .await
    }
}
