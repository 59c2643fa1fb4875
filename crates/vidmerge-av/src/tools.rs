//! External tool detection.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check whether a tool at `program` answers `-version`.
///
/// ffmpeg and ffprobe both take a single-dash version flag.
///
/// # Example
///
/// ```no_run
/// use vidmerge_av::check_tool;
/// use std::path::Path;
///
/// let info = check_tool("ffprobe", Path::new("ffprobe"));
/// if info.available {
///     println!("ffprobe version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str, program: &Path) -> ToolInfo {
    match Command::new(program).arg("-version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: which::which(program).ok(),
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Require that a tool is available on `PATH`, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }

    require_tool(name)
}

/// Resolved locations of the two external programs the pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl ToolPaths {
    /// Resolve both tools, honouring configured overrides.
    ///
    /// A tool that cannot be located is kept as its bare name so that each
    /// invocation fails on its own (and is reported per file) instead of
    /// aborting the run up front.
    pub fn resolve(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Self {
        Self {
            ffmpeg: resolve_or_bare("ffmpeg", ffmpeg),
            ffprobe: resolve_or_bare("ffprobe", ffprobe),
        }
    }

    /// Check both tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        vec![
            check_tool("ffmpeg", &self.ffmpeg),
            check_tool("ffprobe", &self.ffprobe),
        ]
    }
}

fn resolve_or_bare(name: &str, config_path: Option<&Path>) -> PathBuf {
    match get_tool_path(name, config_path) {
        Ok(path) => path,
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("{}; invocations will fail until it is installed", _e);
            config_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_not_found() {
        let info = check_tool("nonexistent", Path::new("nonexistent_tool_12345"));
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }

    #[test]
    fn test_require_missing_tool() {
        let err = require_tool("nonexistent_tool_12345").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn test_configured_path_wins() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = get_tool_path("ffmpeg", Some(file.path())).unwrap();
        assert_eq!(path, file.path());
    }

    #[test]
    fn test_resolve_uses_existing_override() {
        let ffmpeg = tempfile::NamedTempFile::new().unwrap();
        let ffprobe = tempfile::NamedTempFile::new().unwrap();
        let paths = ToolPaths::resolve(Some(ffmpeg.path()), Some(ffprobe.path()));
        assert_eq!(paths.ffmpeg, ffmpeg.path());
        assert_eq!(paths.ffprobe, ffprobe.path());
    }
}
