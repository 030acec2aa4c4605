//! Hardware acceleration planning
//!
//! Maps the host OS and detected GPU vendor to the transcoder flags used by
//! the re-encode step. Anything unsupported falls back to software encoding.

use tracing::{debug, info};

use crate::domain::model::{GpuInfo, GpuVendor, HardwarePlan, HostOs};

pub mod vaapi;

pub use vaapi::RenderNodeLocator;

/// Hardware acceleration planner
#[derive(Debug, Clone, Default)]
pub struct HardwareAccelerationPlanner {
    render_nodes: RenderNodeLocator,
}

impl HardwareAccelerationPlanner {
    /// Create a planner looking for VAAPI nodes in the default location
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a planner with a custom render node locator
    pub fn with_render_nodes(render_nodes: RenderNodeLocator) -> Self {
        Self { render_nodes }
    }

    /// Plan transcoder flags for one request.
    ///
    /// Audio-only requests and undetected vendors always get the software
    /// plan; this never fails.
    pub fn plan(&self, os: HostOs, vendor: GpuVendor, is_audio_only: bool) -> HardwarePlan {
        if is_audio_only || vendor == GpuVendor::None {
            return HardwarePlan::software();
        }

        let plan = match os {
            HostOs::Windows => Self::windows_plan(vendor),
            HostOs::Linux | HostOs::OtherUnix => self.unix_plan(vendor),
            HostOs::MacOs => Self::hardware(vendor, "h264_videotoolbox", &[], &[]),
            HostOs::Unknown => HardwarePlan::software(),
        };

        debug!(
            "Hardware plan for {} / {}: {:?}",
            os,
            vendor,
            plan.extra_args()
        );
        plan
    }

    /// Plan from an optional probe result
    pub fn plan_for(&self, os: HostOs, gpu: Option<&GpuInfo>, is_audio_only: bool) -> HardwarePlan {
        let vendor = gpu.map(|info| info.vendor).unwrap_or(GpuVendor::None);
        self.plan(os, vendor, is_audio_only)
    }

    fn windows_plan(vendor: GpuVendor) -> HardwarePlan {
        match vendor {
            GpuVendor::Nvidia => Self::hardware(vendor, "h264_nvenc", &["-hwaccel", "cuda"], &[]),
            GpuVendor::Amd => Self::hardware(vendor, "h264_amf", &["-hwaccel", "d3d11va"], &[]),
            GpuVendor::Intel => Self::hardware(vendor, "h264_qsv", &["-hwaccel", "d3d11va"], &[]),
            GpuVendor::None => HardwarePlan::software(),
        }
    }

    fn unix_plan(&self, vendor: GpuVendor) -> HardwarePlan {
        match vendor {
            GpuVendor::Nvidia => Self::hardware(vendor, "h264_nvenc", &["-hwaccel", "cuda"], &[]),
            GpuVendor::Amd | GpuVendor::Intel => match self.render_nodes.first_render_node() {
                Some(node) => {
                    let node = node.to_string_lossy().to_string();
                    Self::hardware(
                        vendor,
                        "h264_vaapi",
                        &["-vaapi_device", node.as_str()],
                        &["-vf", "format=nv12,hwupload"],
                    )
                }
                None => {
                    info!(
                        "No VAAPI render node under {}, using encoder without device binding",
                        self.render_nodes.device_dir().display()
                    );
                    Self::hardware(vendor, "h264_vaapi", &[], &[])
                }
            },
            GpuVendor::None => HardwarePlan::software(),
        }
    }

    /// Build a plan; the encoder selection always closes the output args
    fn hardware(
        vendor: GpuVendor,
        codec: &str,
        input_args: &[&str],
        output_filters: &[&str],
    ) -> HardwarePlan {
        let mut output_args: Vec<String> = output_filters.iter().map(|s| s.to_string()).collect();
        output_args.push("-c:v".to_string());
        output_args.push(codec.to_string());

        HardwarePlan {
            vendor,
            codec_id: Some(codec.to_string()),
            input_args: input_args.iter().map(|s| s.to_string()).collect(),
            output_args,
        }
    }
}
