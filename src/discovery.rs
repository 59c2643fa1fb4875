//! Input discovery.
//!
//! Lists the top level of the input directory and keeps files whose extension
//! is in [`vidmerge_av::SUPPORTED_EXTENSIONS`]. Entries are sorted by file name so that the
//! merge order does not depend on how the filesystem enumerates them.

use std::path::{Path, PathBuf};
use vidmerge_av::{Diagnostics, MediaFile};
use walkdir::WalkDir;

/// The input directory could not be listed.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("input directory does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("input path is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("cannot read input directory {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Find the supported video files directly inside `input_dir`, sorted by
/// file name. Paths are absolute.
///
/// An empty result is not an error. Entries that cannot be read, such as
/// dangling symlinks, are reported to `diagnostics` and skipped.
pub fn discover(
    input_dir: &Path,
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<MediaFile>, DiscoveryError> {
    let root = std::fs::canonicalize(input_dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DiscoveryError::NotFound {
            path: input_dir.to_path_buf(),
        },
        _ => DiscoveryError::Unreadable {
            path: input_dir.to_path_buf(),
            source: e,
        },
    })?;

    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory { path: root });
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            // Depth 0 means listing the directory itself failed.
            Err(e) if e.depth() == 0 => {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory loop"));
                return Err(DiscoveryError::Unreadable { path: root, source });
            }
            Err(e) => {
                diagnostics.warn(&format!("skipping unreadable entry: {}", e));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(file) = MediaFile::from_path(entry.into_path()) {
            files.push(file);
        }
    }

    Ok(files)
}
