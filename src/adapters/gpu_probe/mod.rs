// GPU probe adapter - Detects the GPU vendor with platform utilities

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::adapters::exec_process::command;
use crate::domain::errors::DomainError;
use crate::domain::model::{GpuInfo, GpuVendor, HostOs};
use crate::planner::HardwareAccelerationPlanner;
use crate::ports::GpuProbePort;

/// Default sysfs directory listing DRM cards
pub const DEFAULT_DRM_CLASS_DIR: &str = "/sys/class/drm";

const VENDOR_PRIORITY: [GpuVendor; 3] = [GpuVendor::Nvidia, GpuVendor::Amd, GpuVendor::Intel];

/// Vendor named in an adapter description, if any
pub fn vendor_from_description(description: &str) -> GpuVendor {
    let text = description.to_lowercase();
    if text.contains("nvidia") {
        GpuVendor::Nvidia
    } else if text.contains("amd") || text.contains("radeon") || text.contains("advanced micro devices")
    {
        GpuVendor::Amd
    } else if text.contains("intel") {
        GpuVendor::Intel
    } else {
        GpuVendor::None
    }
}

/// Vendor for a PCI vendor ID such as `0x10de`
pub fn vendor_from_pci_id(id: &str) -> GpuVendor {
    match id.trim().to_lowercase().trim_start_matches("0x") {
        "10de" => GpuVendor::Nvidia,
        "1002" => GpuVendor::Amd,
        "8086" => GpuVendor::Intel,
        _ => GpuVendor::None,
    }
}

/// Highest priority adapter among candidate descriptions
fn best_adapter<'a>(names: impl Iterator<Item = &'a str>) -> Option<(GpuVendor, String)> {
    let candidates: Vec<(GpuVendor, &str)> = names
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| (vendor_from_description(name), name))
        .filter(|(vendor, _)| *vendor != GpuVendor::None)
        .collect();

    VENDOR_PRIORITY.iter().find_map(|wanted| {
        candidates
            .iter()
            .find(|(vendor, _)| vendor == wanted)
            .map(|(vendor, name)| (*vendor, name.to_string()))
    })
}

/// Display-class devices from `lspci` output
fn lspci_display_lines(output: &str) -> impl Iterator<Item = &str> {
    output.lines().filter(|line| {
        line.contains("VGA compatible controller")
            || line.contains("3D controller")
            || line.contains("Display controller")
    })
}

/// `Chipset Model:` values from `system_profiler SPDisplaysDataType`
fn system_profiler_models(output: &str) -> impl Iterator<Item = &str> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Chipset Model:"))
}

/// Probe backed by OS utilities and sysfs
#[derive(Debug, Clone)]
pub struct SystemGpuProbe {
    drm_class_dir: PathBuf,
}

impl Default for SystemGpuProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemGpuProbe {
    pub fn new() -> Self {
        Self {
            drm_class_dir: PathBuf::from(DEFAULT_DRM_CLASS_DIR),
        }
    }

    /// Read PCI vendor IDs from a different sysfs root
    pub fn with_drm_class_dir(drm_class_dir: impl Into<PathBuf>) -> Self {
        Self {
            drm_class_dir: drm_class_dir.into(),
        }
    }

    /// Run an instrumentation command and return its stdout
    async fn query(program: &str, args: &[&str]) -> Result<String, DomainError> {
        let output = command(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DomainError::ProbeFailure(format!("{} could not be started: {}", program, e))
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(DomainError::ProbeFailure(format!(
                "{} exited with {}",
                program, output.status
            )))
        }
    }

    /// Like [`Self::query`], degrading failures to `None`
    async fn capture(program: &str, args: &[&str]) -> Option<String> {
        match Self::query(program, args).await {
            Ok(stdout) => Some(stdout),
            Err(e) => {
                debug!("{}", e);
                None
            }
        }
    }

    async fn detect_windows(&self) -> Option<(GpuVendor, String)> {
        let powershell = Self::capture(
            "powershell.exe",
            &[
                "-NoProfile",
                "-ExecutionPolicy",
                "Bypass",
                "-Command",
                "Get-CimInstance -ClassName Win32_VideoController | Select-Object -ExpandProperty Name",
            ],
        )
        .await;

        let names = match powershell {
            Some(names) => names,
            None => {
                warn!("PowerShell GPU query failed, falling back to WMIC");
                Self::capture("wmic", &["path", "win32_VideoController", "get", "name"]).await?
            }
        };
        best_adapter(names.lines())
    }

    async fn detect_linux(&self) -> Option<(GpuVendor, String)> {
        if let Some(output) = Self::capture("lspci", &[]).await {
            if let Some(found) = best_adapter(lspci_display_lines(&output)) {
                return Some(found);
            }
        }
        debug!("lspci gave nothing usable, reading PCI vendor IDs");
        self.detect_from_sysfs()
    }

    async fn detect_macos(&self) -> Option<(GpuVendor, String)> {
        let output = Self::capture("system_profiler", &["SPDisplaysDataType"]).await?;
        best_adapter(system_profiler_models(&output))
    }

    /// Vendor of the DRM cards under the sysfs class directory
    fn detect_from_sysfs(&self) -> Option<(GpuVendor, String)> {
        let vendors: Vec<(GpuVendor, String)> = WalkDir::new(&self.drm_class_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy();
                name.starts_with("card") && !name.contains('-')
            })
            .filter_map(|entry| read_pci_vendor(entry.path()))
            .collect();

        VENDOR_PRIORITY.iter().find_map(|wanted| {
            vendors
                .iter()
                .find(|(vendor, _)| vendor == wanted)
                .cloned()
        })
    }
}

fn read_pci_vendor(card: &Path) -> Option<(GpuVendor, String)> {
    let id = std::fs::read_to_string(card.join("device").join("vendor")).ok()?;
    let vendor = vendor_from_pci_id(&id);
    if vendor == GpuVendor::None {
        return None;
    }
    let card_name = card.file_name()?.to_string_lossy().to_string();
    Some((vendor, format!("{} ({})", vendor, card_name)))
}

#[async_trait]
impl GpuProbePort for SystemGpuProbe {
    async fn detect(&self, os: HostOs) -> Option<GpuInfo> {
        info!("Detecting GPU for hardware acceleration on {}", os);
        let found = match os {
            HostOs::Windows => self.detect_windows().await,
            HostOs::Linux | HostOs::OtherUnix => self.detect_linux().await,
            HostOs::MacOs => self.detect_macos().await,
            HostOs::Unknown => None,
        };

        match found {
            Some((vendor, name)) => {
                let codec_id = HardwareAccelerationPlanner::new()
                    .plan(os, vendor, false)
                    .codec_id;
                info!("{} GPU detected: {}", vendor, name);
                Some(GpuInfo {
                    vendor,
                    name,
                    codec_id,
                })
            }
            None => {
                info!("No supported GPU for hardware acceleration was found, using CPU");
                None
            }
        }
    }
}
