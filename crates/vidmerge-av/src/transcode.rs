//! Per-file normalization to a fixed codec profile.

use crate::command::{ToolCommand, DEFAULT_TIMEOUT};
use crate::diagnostics::Diagnostics;
use crate::media::MediaFile;
use crate::probe::{parse_streams, probe_streams};
use crate::profile::CodecProfile;
use crate::tools::ToolPaths;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which stage rejected a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// ffprobe could not read the input.
    Probe,
    /// ffmpeg failed, could not be started, or timed out.
    Transcode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Probe => f.write_str("probe failed"),
            FailureKind::Transcode => f.write_str("transcode failed"),
        }
    }
}

/// Outcome of normalizing one file. Never an error: failures are values so
/// the batch can carry on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeResult {
    Success(PathBuf),
    Failure { kind: FailureKind, detail: String },
}

impl TranscodeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TranscodeResult::Success(_))
    }
}

/// Settings shared by every transcode in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeSettings {
    /// Constant output frame rate forced on every segment.
    pub fps: u32,
    /// Run ffprobe before encoding.
    pub probe: bool,
    /// Upper bound for each external invocation.
    pub timeout: Duration,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            probe: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Runs ffmpeg once per input file.
#[derive(Debug, Clone)]
pub struct Transcoder {
    tools: ToolPaths,
    settings: TranscodeSettings,
}

impl Transcoder {
    pub fn new(tools: ToolPaths, settings: TranscodeSettings) -> Self {
        Self { tools, settings }
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    pub fn settings(&self) -> &TranscodeSettings {
        &self.settings
    }

    /// Full ffmpeg argument list for one normalization.
    ///
    /// Existing output is overwritten. Frame rate is forced to a constant
    /// value so that all segments share timing for the later stream copy.
    /// `-fps_mode` needs ffmpeg 5.1 or newer.
    pub fn transcode_args(&self, input: &Path, output: &Path, profile: &CodecProfile) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-nostdin".into(),
            "-y".into(),
            "-i".into(),
            input.to_string_lossy().into(),
            "-fps_mode".into(),
            "cfr".into(),
            "-r".into(),
            self.settings.fps.to_string(),
        ];
        args.extend(profile.encoder_args());
        args.extend(["-max_muxing_queue_size".to_string(), "1024".to_string()]);
        args.push(output.to_string_lossy().into());
        args
    }

    /// Normalize `input` into `output` using `profile`.
    ///
    /// Success is decided by ffmpeg's exit status alone. On failure a
    /// partial file may be left at `output`.
    pub async fn normalize(
        &self,
        input: &MediaFile,
        output: &Path,
        profile: &CodecProfile,
        diagnostics: &dyn Diagnostics,
    ) -> TranscodeResult {
        if self.settings.probe {
            match probe_streams(&self.tools.ffprobe, input.path(), self.settings.timeout).await {
                Ok(json) => match parse_streams(&json) {
                    Ok(summary) => diagnostics.debug(&format!("{input}: {summary}")),
                    Err(e) => diagnostics.warn(&format!("{input}: unreadable probe output: {e}")),
                },
                Err(e) => {
                    diagnostics.error(&format!("cannot read stream info: {input}: {e}"));
                    return TranscodeResult::Failure {
                        kind: FailureKind::Probe,
                        detail: e.detail(),
                    };
                }
            }
        }

        diagnostics.debug(&format!(
            "converting {input} -> {} ({})",
            output.display(),
            profile.name
        ));

        let result = ToolCommand::new(self.tools.ffmpeg.clone())
            .args(self.transcode_args(input.path(), output, profile))
            .timeout(self.settings.timeout)
            .execute()
            .await;

        match result {
            Ok(_) => {
                diagnostics.info(&format!("converted: {input}"));
                TranscodeResult::Success(output.to_path_buf())
            }
            Err(e) => {
                diagnostics.error(&format!("conversion failed: {input}"));
                diagnostics.error(&e.detail());
                TranscodeResult::Failure {
                    kind: FailureKind::Transcode,
                    detail: e.detail(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NullDiagnostics;
    use crate::profile::DEFAULT_PROFILE;

    fn transcoder(ffmpeg: &str, probe: bool) -> Transcoder {
        Transcoder::new(
            ToolPaths {
                ffmpeg: PathBuf::from(ffmpeg),
                ffprobe: PathBuf::from("nonexistent_ffprobe_12345"),
            },
            TranscodeSettings {
                probe,
                ..TranscodeSettings::default()
            },
        )
    }

    #[test]
    fn test_transcode_args_shape() {
        let t = transcoder("ffmpeg", false);
        let args = t.transcode_args(Path::new("/in/a.avi"), Path::new("/out/a_converted.mp4"), &DEFAULT_PROFILE);

        assert_eq!(&args[..5], ["-hide_banner", "-nostdin", "-y", "-i", "/in/a.avi"]);
        assert!(args.windows(2).any(|w| w == ["-r", "30"]));
        assert!(args.windows(2).any(|w| w == ["-fps_mode", "cfr"]));
        assert!(args.windows(2).any(|w| w == ["-c:v", "libx264"]));
        assert!(args.windows(2).any(|w| w == ["-max_muxing_queue_size", "1024"]));
        assert_eq!(args.last().map(String::as_str), Some("/out/a_converted.mp4"));
    }

    #[tokio::test]
    async fn test_missing_ffprobe_is_probe_failure() {
        let t = transcoder("ffmpeg", true);
        let input = MediaFile::from_path("/in/a.mp4").unwrap();
        let result = t
            .normalize(&input, Path::new("/out/a.mp4"), &DEFAULT_PROFILE, &NullDiagnostics)
            .await;
        match result {
            TranscodeResult::Failure { kind, detail } => {
                assert_eq!(kind, FailureKind::Probe);
                assert!(detail.contains("nonexistent_ffprobe_12345"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_is_transcode_failure() {
        let t = transcoder("nonexistent_ffmpeg_12345", false);
        let input = MediaFile::from_path("/in/a.mp4").unwrap();
        let result = t
            .normalize(&input, Path::new("/out/a.mp4"), &DEFAULT_PROFILE, &NullDiagnostics)
            .await;
        assert_eq!(
            result,
            TranscodeResult::Failure {
                kind: FailureKind::Transcode,
                detail: "tool not found: nonexistent_ffmpeg_12345".to_string(),
            }
        );
    }
}
