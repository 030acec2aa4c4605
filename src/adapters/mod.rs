// Adapters - External system implementations

pub mod dependency_resolver;
pub mod exec_process;
pub mod gpu_probe;
pub mod http_fetch;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use dependency_resolver::DependencyResolver;
pub use exec_process::TokioProcessRunner;
pub use gpu_probe::SystemGpuProbe;
pub use http_fetch::HttpArtifactSource;
pub use toml_config::TomlConfigAdapter;
pub use tracing_log::TracingProgressSink;
