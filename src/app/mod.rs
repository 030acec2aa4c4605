// Application layer - Use case interactors

pub mod clip_interactor;
pub mod container;
pub mod deps_interactor;
pub mod probe_interactor;
pub mod session;

// Re-export interactors
pub use clip_interactor::{AccelerationPolicy, ClipInteractor, ClipReport};
pub use container::{AppContainer, DefaultAppContainer};
pub use deps_interactor::{DependencyInteractor, DependencyStatus};
pub use probe_interactor::{ProbeInteractor, ProbeReport};
pub use session::{ActionKind, ActionPermit, SessionContext, SingleFlight};
