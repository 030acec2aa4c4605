//! VAAPI render node lookup

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Default directory holding DRM device nodes
pub const DEFAULT_DRI_DIR: &str = "/dev/dri";

/// Finds the render node VAAPI encoders bind to
#[derive(Debug, Clone)]
pub struct RenderNodeLocator {
    device_dir: PathBuf,
}

impl RenderNodeLocator {
    pub fn new(device_dir: impl Into<PathBuf>) -> Self {
        Self {
            device_dir: device_dir.into(),
        }
    }

    pub fn device_dir(&self) -> &Path {
        &self.device_dir
    }

    /// First `renderD*` entry by name, if any
    pub fn first_render_node(&self) -> Option<PathBuf> {
        let node = WalkDir::new(&self.device_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .find(|entry| entry.file_name().to_string_lossy().starts_with("renderD"))
            .map(|entry| entry.into_path());

        debug!(
            "Render node lookup in {}: {:?}",
            self.device_dir.display(),
            node
        );
        node
    }
}

impl Default for RenderNodeLocator {
    fn default() -> Self {
        Self::new(DEFAULT_DRI_DIR)
    }
}
