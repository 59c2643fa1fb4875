use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub transcode: TranscodeConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Where converted files, the manifest and the merged file go.
    /// Defaults to `<input>/converted`.
    #[serde(default)]
    pub folder: Option<PathBuf>,

    /// Target container extension.
    #[serde(default = "default_format")]
    pub format: String,

    /// Merged file name. Defaults to `merged_video.<format>`.
    #[serde(default)]
    pub filename: Option<String>,

    /// Concat manifest file name.
    #[serde(default = "default_manifest")]
    pub manifest: String,
}

fn default_format() -> String {
    "mp4".to_string()
}

fn default_manifest() -> String {
    "video_list.txt".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: None,
            format: default_format(),
            filename: None,
            manifest: default_manifest(),
        }
    }
}

impl OutputConfig {
    pub fn merged_filename(&self) -> String {
        self.filename
            .clone()
            .unwrap_or_else(|| format!("merged_video.{}", self.format))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscodeConfig {
    /// Constant frame rate forced on every converted file.
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Probe each input with ffprobe before converting it.
    #[serde(default = "default_probe")]
    pub probe: bool,

    /// Files converted concurrently. 1 keeps the run strictly sequential.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

fn default_fps() -> u32 {
    30
}
fn default_probe() -> bool {
    true
}
fn default_jobs() -> usize {
    1
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            probe: default_probe(),
            jobs: default_jobs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    /// Limit for each ffmpeg/ffprobe invocation, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    3600
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}
