// Probe interactor - Reports the detected GPU and the resulting plan

use serde::Serialize;
use std::sync::Arc;

use crate::app::session::{ActionKind, SessionContext};
use crate::domain::errors::DomainError;
use crate::domain::model::{GpuInfo, HardwarePlan, HostOs};

/// What the session knows about hardware acceleration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub os: HostOs,
    pub gpu: Option<GpuInfo>,
    pub plan: HardwarePlan,
}

/// Interactor for the GPU probe use case
pub struct ProbeInteractor {
    session: Arc<SessionContext>,
}

impl ProbeInteractor {
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self { session }
    }

    pub async fn probe(&self) -> Result<ProbeReport, DomainError> {
        let _permit = self.session.flights().try_acquire(ActionKind::GpuProbe)?;

        let plan = self.session.hardware_plan().await.clone();
        let gpu = self.session.gpu().await.cloned();
        Ok(ProbeReport {
            os: self.session.os(),
            gpu,
            plan,
        })
    }
}
