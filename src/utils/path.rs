//! Path utilities for output templates and managed binaries

use std::path::{Path, PathBuf};

/// Path helpers shared by the request builder and the dependency resolver
pub struct PathUtils;

impl PathUtils {
    /// Create a new path utils instance
    pub fn new() -> Self {
        Self
    }
}

impl Default for PathUtils {
    fn default() -> Self {
        Self::new()
    }
}

impl PathUtils {
    /// Drop whatever extension the user typed; the transcoder decides it
    pub fn strip_extension(&self, path: &str) -> PathBuf {
        let path = Path::new(path.trim());
        if path.extension().is_some() {
            path.with_extension("")
        } else {
            path.to_path_buf()
        }
    }

    /// Output base for a user path, or `None` when it names no file
    /// (a directory such as `clips/`, or a bare extension such as `out/.mp4`)
    pub fn output_base(&self, path: &str) -> Option<PathBuf> {
        let trimmed = path.trim();
        if trimmed.ends_with(std::path::is_separator) {
            return None;
        }
        let name = Path::new(trimmed).file_name()?;
        if name.to_string_lossy().starts_with('.') {
            return None;
        }
        Some(self.strip_extension(trimmed))
    }

    /// Build a downloader output template (`<base>.%(ext)s`).
    ///
    /// `%` is the template metacharacter, so literal percent signs in the
    /// user's path are doubled.
    pub fn output_template(&self, base: &Path) -> String {
        let escaped = base.to_string_lossy().replace('%', "%%");
        format!("{}.%(ext)s", escaped)
    }

    /// Platform executable name for a tool
    pub fn executable_name(&self, tool: &str) -> String {
        if cfg!(target_os = "windows") {
            format!("{}.exe", tool)
        } else {
            tool.to_string()
        }
    }

    /// Whether a path names a bare program to be looked up on PATH
    pub fn is_bare_program(&self, path: &Path) -> bool {
        path.parent()
            .map(|parent| parent.as_os_str().is_empty())
            .unwrap_or(true)
    }

    /// Base name of an archive member, ignoring its directory
    pub fn member_basename<'a>(&self, member: &'a str) -> Option<&'a str> {
        Path::new(member).file_name().and_then(|name| name.to_str())
    }
}
