//! Build errors, each naming the stage that failed.

use crate::audio::MergeError;
use thiserror::Error;
use tts_client::TtsError;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no text to synthesize")]
    EmptyText,

    #[error("invalid artifact name {0:?}: must be non-empty and contain no path separators")]
    InvalidBaseName(String),

    #[error("synthesis failed for segment {part}/{total}: {source}")]
    Synthesis {
        /// 1-based position of the failing segment
        part: usize,
        total: usize,
        source: TtsError,
    },

    #[error("merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl BuildError {
    /// Short name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::EmptyText | Self::InvalidBaseName(_) => "input",
            Self::Synthesis { .. } => "synthesis",
            Self::Merge(_) => "merge",
            Self::Io { .. } => "staging",
        }
    }
}
