//! Concat-demuxer manifests and the final stream-copy merge.

use crate::command::ToolCommand;
use crate::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

/// Ordered list of segments for ffmpeg's concat demuxer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConcatManifest {
    entries: Vec<PathBuf>,
}

impl ConcatManifest {
    pub fn new(entries: Vec<PathBuf>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `file '<path>'` directive per segment, in order.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|p| format!("file '{}'\n", escape_path(&p.to_string_lossy())))
            .collect()
    }

    /// Write the manifest to `path`, replacing any previous file atomically.
    ///
    /// # Errors
    ///
    /// An empty manifest is rejected; the concat demuxer would produce nothing.
    pub fn write(&self, path: &Path) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidInput("concat manifest has no segments".to_string()));
        }

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(self.render().as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        #[cfg(feature = "tracing")]
        tracing::debug!("wrote concat manifest {:?} ({} segments)", path, self.entries.len());

        Ok(())
    }
}

/// Quote a path for a single-quoted concat directive.
///
/// The demuxer has no escape inside quotes, so each `'` closes the string,
/// emits an escaped quote and reopens: `it's` becomes `it'\''s`.
pub fn escape_path(path: &str) -> String {
    path.replace('\'', r"'\''")
}

/// ffmpeg arguments that join the manifest's segments by stream copy.
///
/// `-safe 0` allows absolute paths in the manifest.
pub fn concat_args(manifest: &Path, output: &Path) -> Vec<String> {
    vec![
        "-hide_banner".into(),
        "-nostdin".into(),
        "-y".into(),
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        manifest.to_string_lossy().into(),
        "-c".into(),
        "copy".into(),
        output.to_string_lossy().into(),
    ]
}

/// Join the segments listed in `manifest` into `output` without re-encoding.
///
/// # Errors
///
/// Propagates the ffmpeg failure; its stderr is the error detail.
pub async fn concat(ffmpeg: &Path, manifest: &Path, output: &Path, timeout: Duration) -> Result<()> {
    ToolCommand::new(ffmpeg.to_path_buf())
        .args(concat_args(manifest, output))
        .timeout(timeout)
        .execute()
        .await?;
    Ok(())
}
