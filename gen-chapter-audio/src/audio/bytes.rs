//! Stream-level concatenation by copying bytes.
//!
//! Frame-based streams such as MP3 or ADTS play back correctly when their
//! files are appended to one another, so for those this is a codec copy that
//! needs no external tools.

use super::{AudioMerger, MergeError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Merger that appends the raw bytes of each input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteConcatMerger;

#[async_trait]
impl AudioMerger for ByteConcatMerger {
    async fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError> {
        if inputs.is_empty() {
            return Err(MergeError::NoInputs);
        }

        let write_err = |source| MergeError::Write {
            path: output.to_path_buf(),
            source,
        };

        let mut out = File::create(output).await.map_err(write_err)?;
        for path in inputs {
            // One input in memory at a time
            let data = tokio::fs::read(path)
                .await
                .map_err(|_| MergeError::MissingInput(path.clone()))?;
            out.write_all(&data).await.map_err(write_err)?;
        }
        out.flush().await.map_err(write_err)?;
        out.sync_all().await.map_err(write_err)?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "bytes"
    }
}
