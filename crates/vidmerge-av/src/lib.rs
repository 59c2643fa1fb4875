//! # vidmerge-av
//!
//! ffmpeg/ffprobe plumbing for normalizing videos and joining them losslessly.
//!
//! This crate provides:
//! - Tool lookup ([`ToolPaths`], [`check_tool`]) and a timeout-bounded
//!   async runner ([`ToolCommand`])
//! - The fixed codec profile table ([`resolve_profile`], [`CodecProfile`])
//! - Per-file normalization with isolated failures ([`Transcoder`])
//! - Concat manifests and the stream-copy merge ([`ConcatManifest`], [`concat`])
//!
//! ## Features
//!
//! - `tracing` - Emit `tracing` events and enable [`TracingDiagnostics`]
//!
//! ## Example
//!
//! ```no_run
//! use vidmerge_av::{resolve_profile, MediaFile, NullDiagnostics, ToolPaths, Transcoder};
//! use std::path::Path;
//!
//! # async fn example() {
//! let transcoder = Transcoder::new(ToolPaths::resolve(None, None), Default::default());
//! let input = MediaFile::from_path("/videos/clip.avi").unwrap();
//! let result = transcoder
//!     .normalize(&input, Path::new("/videos/converted/clip_converted.mp4"),
//!                resolve_profile("mp4"), &NullDiagnostics)
//!     .await;
//! println!("{result:?}");
//! # }
//! ```

pub mod command;
pub mod concat;
pub mod diagnostics;
mod error;
pub mod media;
pub mod probe;
pub mod profile;
pub mod tools;
pub mod transcode;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use concat::{concat, ConcatManifest};
pub use diagnostics::{Diagnostics, Level, NullDiagnostics};
#[cfg(feature = "tracing")]
pub use diagnostics::TracingDiagnostics;
pub use error::{Error, Result};
pub use media::{MediaFile, SUPPORTED_EXTENSIONS};
pub use probe::StreamSummary;
pub use profile::{resolve_profile, CodecProfile, Container, RateControl, DEFAULT_PROFILE};
pub use tools::{check_tool, get_tool_path, require_tool, ToolInfo, ToolPaths};
pub use transcode::{FailureKind, TranscodeResult, TranscodeSettings, Transcoder};
