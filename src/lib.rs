//! vidmerge - normalize a folder of videos and join them into one file.
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod discovery;
pub mod merge;

pub use discovery::{discover, DiscoveryError};
pub use merge::{
    FileFailure, MergeError, MergeOrchestrator, MergeOutcome, MergeReport, MergeRequest,
};
