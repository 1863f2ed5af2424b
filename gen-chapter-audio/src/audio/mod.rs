//! Lossless reassembly of per-segment audio into one artifact.

pub mod assembler;
mod bytes;
mod ffmpeg;

pub use assembler::concatenate;
pub use bytes::ByteConcatMerger;
pub use ffmpeg::FfmpegMerger;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the merge step.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("no audio files provided")]
    NoInputs,

    #[error("input file missing: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("failed to write concat list {}: {source}", path.display())]
    ListFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Process {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("merge produced no output at {}", .0.display())]
    EmptyOutput(PathBuf),

    #[error("failed to remove merged input {}: {source}", path.display())]
    RemoveInput {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Lossless merge capability - joins same-codec files without re-encoding.
#[async_trait]
pub trait AudioMerger: Send + Sync {
    /// Write the ordered concatenation of `inputs` to `output`.
    async fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError>;

    /// Merger name for display
    fn name(&self) -> &'static str;
}
