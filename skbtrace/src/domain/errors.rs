//! Structured error types for skbtrace
//!
//! Only setup and sink failures are errors. Lookup misses during rendering
//! (exited process, unknown symbol, consumed side-table entry) are part of the
//! output format and never reach this module.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Failed to create output file {path}: {source}")]
    SinkCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read kernel symbols from {path}: {source}")]
    KallsymsReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No text symbols found in {0}")]
    KallsymsEmpty(PathBuf),

    #[error("Failed to open pinned map {path}: {error}")]
    PinnedMapOpenFailed { path: PathBuf, error: String },

    #[error("Unsupported architecture: {0} (expected x86_64 or aarch64)")]
    UnsupportedArch(&'static str),

    #[error(transparent)]
    Map(#[from] aya::maps::MapError),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write trace output: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize event: {0}")]
    Json(#[from] serde_json::Error),
}
