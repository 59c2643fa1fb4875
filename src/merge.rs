//! Transcode-then-concat orchestration.
//!
//! A run discovers the inputs, normalizes each one to the target profile,
//! writes a concat manifest listing the files that converted, and joins them
//! with a single stream-copy ffmpeg invocation. Per-file failures are recorded
//! and skipped; only discovery and the final merge can fail the run.

use crate::discovery::{discover, DiscoveryError};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vidmerge_av::{
    concat, resolve_profile, ConcatManifest, Diagnostics, FailureKind, MediaFile, TranscodeResult,
    Transcoder,
};

/// Everything one merge run needs to know about its inputs and outputs.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Target container extension, e.g. `mp4`.
    pub format: String,
    /// File name of the merged artifact inside `output_dir`.
    pub output_filename: String,
    /// File name of the concat manifest inside `output_dir`.
    pub manifest_name: String,
}

impl MergeRequest {
    /// A request with the stock names: `<input>/converted`, mp4,
    /// `merged_video.mp4` and `video_list.txt`.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        Self {
            output_dir: input_dir.join("converted"),
            input_dir,
            format: "mp4".to_string(),
            output_filename: "merged_video.mp4".to_string(),
            manifest_name: "video_list.txt".to_string(),
        }
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_filename)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.manifest_name)
    }
}

/// A file that was dropped from the merge, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub input: PathBuf,
    pub kind: FailureKind,
    pub detail: String,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.input.display(), self.kind, self.detail.trim())
    }
}

/// Result of a completed merge.
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub artifact: PathBuf,
    pub manifest: PathBuf,
    /// Converted segments, in the order they were joined.
    pub segments: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone)]
pub enum MergeOutcome {
    /// Every listed segment was joined into the artifact.
    Merged(MergeReport),
    /// Discovery found nothing to do. No files were created.
    NoInput,
}

/// A run-level failure.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("all {} file(s) failed to convert", failures.len())]
    AllTranscodesFailed { failures: Vec<FileFailure> },

    #[error("cannot write concat manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: vidmerge_av::Error,
    },

    #[error("merge failed: {detail}")]
    Merge {
        detail: String,
        failures: Vec<FileFailure>,
    },
}

impl MergeError {
    /// Per-file failures recorded before the run failed.
    pub fn failures(&self) -> &[FileFailure] {
        match self {
            MergeError::AllTranscodesFailed { failures } | MergeError::Merge { failures, .. } => {
                failures
            }
            _ => &[],
        }
    }
}

/// Drives discovery, per-file normalization and the final concat.
pub struct MergeOrchestrator {
    transcoder: Transcoder,
    diagnostics: Arc<dyn Diagnostics>,
    jobs: usize,
}

impl MergeOrchestrator {
    pub fn new(transcoder: Transcoder, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            transcoder,
            diagnostics,
            jobs: 1,
        }
    }

    /// Allow up to `jobs` files to convert at once. Segment order is still
    /// discovery order.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub async fn merge(&self, request: &MergeRequest) -> Result<MergeOutcome, MergeError> {
        let diag = self.diagnostics.as_ref();

        let files = discover(&request.input_dir, diag)?;
        let files = exclude_own_outputs(files, request);

        if files.is_empty() {
            diag.warn(&format!(
                "no video files found in {}",
                request.input_dir.display()
            ));
            return Ok(MergeOutcome::NoInput);
        }

        diag.info(&format!("found {} video file(s)", files.len()));

        std::fs::create_dir_all(&request.output_dir).map_err(|source| MergeError::OutputDir {
            path: request.output_dir.clone(),
            source,
        })?;
        // Manifest entries must be absolute.
        let output_dir = std::fs::canonicalize(&request.output_dir).map_err(|source| {
            MergeError::OutputDir {
                path: request.output_dir.clone(),
                source,
            }
        })?;
        let manifest_path = output_dir.join(&request.manifest_name);
        let artifact_path = output_dir.join(&request.output_filename);

        remove_stale_manifest(&manifest_path, diag);

        let profile = resolve_profile(&request.format);
        diag.debug(&format!(
            "target .{} uses profile {}",
            request.format, profile.name
        ));

        let names = output_names(&files, &request.format);
        let jobs = files.into_iter().zip(names);

        // `buffered` yields in input order whatever the completion order.
        let results: Vec<(MediaFile, TranscodeResult)> = stream::iter(jobs)
            .map(|(file, name)| {
                let output = output_dir.join(name);
                async move {
                    let result = self
                        .transcoder
                        .normalize(&file, &output, profile, diag)
                        .await;
                    (file, result)
                }
            })
            .buffered(self.jobs)
            .collect()
            .await;

        let mut segments = Vec::new();
        let mut failures = Vec::new();
        for (file, result) in results {
            match result {
                TranscodeResult::Success(path) => segments.push(path),
                TranscodeResult::Failure { kind, detail } => failures.push(FileFailure {
                    input: file.path().to_path_buf(),
                    kind,
                    detail,
                }),
            }
        }

        if segments.is_empty() {
            diag.error("no file converted successfully; nothing to merge");
            return Err(MergeError::AllTranscodesFailed { failures });
        }

        if !failures.is_empty() {
            diag.warn(&format!(
                "{} file(s) failed and will be left out of the merge",
                failures.len()
            ));
        }

        let manifest = ConcatManifest::new(segments);
        manifest
            .write(&manifest_path)
            .map_err(|source| MergeError::Manifest {
                path: manifest_path.clone(),
                source,
            })?;

        diag.info(&format!(
            "merging {} segment(s) into {}",
            manifest.entries().len(),
            artifact_path.display()
        ));

        let tools = self.transcoder.tools();
        let timeout = self.transcoder.settings().timeout;
        if let Err(e) = concat(&tools.ffmpeg, &manifest_path, &artifact_path, timeout).await {
            diag.error("merge failed");
            diag.error(&e.detail());
            return Err(MergeError::Merge {
                detail: e.detail(),
                failures,
            });
        }

        diag.info(&format!("merged video written to {}", artifact_path.display()));

        Ok(MergeOutcome::Merged(MergeReport {
            artifact: artifact_path,
            manifest: manifest_path,
            segments: manifest.entries().to_vec(),
            failures,
        }))
    }
}

/// Pick one output file name per input, in input order, with no two equal.
///
/// A stem shared by several inputs (`a.avi`, `a.mp4`) gets the source
/// extension folded into its name. Anything still clashing after that, such
/// as `a.mp4` next to `a.MP4`, gets a numeric suffix. Names are compared
/// case-insensitively.
fn output_names(files: &[MediaFile], format: &str) -> Vec<String> {
    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for file in files {
        *stem_counts.entry(file.stem().to_lowercase()).or_default() += 1;
    }

    let suffix = format!("_converted.{format}");
    let mut taken = HashSet::new();
    files
        .iter()
        .map(|file| {
            let name = if stem_counts[&file.stem().to_lowercase()] > 1 {
                file.qualified_converted_name(format)
            } else {
                file.converted_name(format)
            };
            if taken.insert(name.to_lowercase()) {
                return name;
            }
            let base = name.strip_suffix(&suffix).unwrap_or(&name).to_string();
            (2..)
                .map(|n| format!("{base}_{n}{suffix}"))
                .find(|candidate| taken.insert(candidate.to_lowercase()))
                .unwrap_or(name)
        })
        .collect()
}

/// When output and input share a directory, skip what earlier runs wrote
/// there so they are not merged into themselves.
fn exclude_own_outputs(files: Vec<MediaFile>, request: &MergeRequest) -> Vec<MediaFile> {
    let same_dir = match (
        std::fs::canonicalize(&request.input_dir),
        std::fs::canonicalize(&request.output_dir),
    ) {
        (Ok(input), Ok(output)) => input == output,
        _ => false,
    };
    if !same_dir {
        return files;
    }

    let suffix = format!("_converted.{}", request.format);
    files
        .into_iter()
        .filter(|file| {
            let name = file
                .path()
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            name != request.output_filename && !name.ends_with(&suffix)
        })
        .collect()
}

fn remove_stale_manifest(path: &Path, diag: &dyn Diagnostics) {
    match std::fs::remove_file(path) {
        Ok(()) => diag.debug(&format!("removed stale manifest {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => diag.warn(&format!(
            "cannot remove stale manifest {}: {}",
            path.display(),
            e
        )),
    }
}
