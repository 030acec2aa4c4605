use std::sync::Arc;

use crate::adapters::{DependencyResolver, HttpArtifactSource, SystemGpuProbe, TokioProcessRunner};
use crate::app::clip_interactor::{AccelerationPolicy, ClipInteractor};
use crate::app::deps_interactor::DependencyInteractor;
use crate::app::probe_interactor::ProbeInteractor;
use crate::app::session::SessionContext;
use crate::config_initialization::ClipperConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::HostOs;
use crate::planner::HardwareAccelerationPlanner;
use crate::ports::{ArtifactSource, DependencyPort, DownloadConsent, GpuProbePort, ProcessRunner};

pub trait AppContainer: Send + Sync {
    fn session(&self) -> Arc<SessionContext>;
    fn clip_interactor(&self) -> Arc<ClipInteractor>;
    fn dependency_interactor(&self) -> Arc<DependencyInteractor>;
    fn probe_interactor(&self) -> Arc<ProbeInteractor>;
}

pub struct DefaultAppContainer {
    session: Arc<SessionContext>,
    clip_interactor: Arc<ClipInteractor>,
    dependency_interactor: Arc<DependencyInteractor>,
    probe_interactor: Arc<ProbeInteractor>,
}

impl DefaultAppContainer {
    /// Wire the production adapters; `consent` decides about downloads
    pub fn new(
        config: &ClipperConfig,
        consent: Arc<dyn DownloadConsent>,
    ) -> Result<Self, DomainError> {
        let runner = Arc::new(TokioProcessRunner::new());
        let probe = Arc::new(SystemGpuProbe::new());
        let source = Arc::new(HttpArtifactSource::new(config.download_timeout())?);

        let resolver = Arc::new(DependencyResolver::new(
            config.clipper.bin_dir.clone(),
            Arc::clone(&runner) as Arc<dyn ProcessRunner>,
            source as Arc<dyn ArtifactSource>,
            consent,
        ));

        let session = Arc::new(SessionContext::new(
            HostOs::current(),
            probe as Arc<dyn GpuProbePort>,
            HardwareAccelerationPlanner::new(),
        ));

        let clip_interactor = Arc::new(ClipInteractor::new(
            Arc::clone(&session),
            Arc::clone(&resolver) as Arc<dyn DependencyPort>,
            Arc::clone(&runner) as Arc<dyn ProcessRunner>,
            AccelerationPolicy {
                enabled: config.clipper.hardware_acceleration,
                wait_for_probe: config.clipper.wait_for_probe,
            },
        ));

        let dependency_interactor = Arc::new(DependencyInteractor::new(
            Arc::clone(&session),
            Arc::clone(&resolver) as Arc<dyn DependencyPort>,
        ));

        let probe_interactor = Arc::new(ProbeInteractor::new(Arc::clone(&session)));

        Ok(Self {
            session,
            clip_interactor,
            dependency_interactor,
            probe_interactor,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn session(&self) -> Arc<SessionContext> {
        Arc::clone(&self.session)
    }

    fn clip_interactor(&self) -> Arc<ClipInteractor> {
        Arc::clone(&self.clip_interactor)
    }

    fn dependency_interactor(&self) -> Arc<DependencyInteractor> {
        Arc::clone(&self.dependency_interactor)
    }

    fn probe_interactor(&self) -> Arc<ProbeInteractor> {
        Arc::clone(&self.probe_interactor)
    }
}
