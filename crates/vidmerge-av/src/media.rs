//! Source media files.

use std::path::{Path, PathBuf};

/// Extensions (lowercase, without the dot) accepted as video input.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv"];

/// A source file believed to be a video, identified by its extension.
///
/// The pipeline only ever reads from it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaFile {
    path: PathBuf,
}

impl MediaFile {
    /// Wrap `path` if its extension is one of [`SUPPORTED_EXTENSIONS`]
    /// (case-insensitive).
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(ext))
            });
        supported.then_some(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without its extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Source extension, lowercased.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    /// Name of the normalized output for this file: `<stem>_converted.<ext>`.
    pub fn converted_name(&self, extension: &str) -> String {
        format!("{}_converted.{}", self.stem(), extension)
    }

    /// Output name that keeps the source extension in it, for when another
    /// input shares this file's stem: `<stem>_<srcext>_converted.<ext>`.
    pub fn qualified_converted_name(&self, extension: &str) -> String {
        format!(
            "{}_{}_converted.{}",
            self.stem(),
            self.extension(),
            extension
        )
    }
}

impl std::fmt::Display for MediaFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
