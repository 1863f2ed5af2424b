//! Audio reassembly: merge staged parts, verify, and clean up.

use super::{AudioMerger, MergeError};
use std::path::{Path, PathBuf};

/// Remove `path` if present.
async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("failed to discard {}: {}", path.display(), e);
        }
    }
}

/// Concatenate ordered audio parts into `output_path` without re-encoding.
///
/// On success every input file has been removed. On failure the partial
/// output is discarded and the inputs are left for the caller to clean up.
///
/// # Arguments
/// * `merger` - Lossless merge capability
/// * `inputs` - Part files in playback order
/// * `output_path` - Destination for the merged stream
pub async fn concatenate(
    merger: &dyn AudioMerger,
    inputs: &[PathBuf],
    output_path: &Path,
) -> Result<u64, MergeError> {
    if inputs.is_empty() {
        return Err(MergeError::NoInputs);
    }

    for path in inputs {
        let is_file = tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(MergeError::MissingInput(path.clone()));
        }
    }

    log::debug!(
        "merging {} parts with {} -> {}",
        inputs.len(),
        merger.name(),
        output_path.display()
    );

    if let Err(e) = merger.merge(inputs, output_path).await {
        discard(output_path).await;
        return Err(e);
    }

    let size = tokio::fs::metadata(output_path)
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    if size == 0 {
        discard(output_path).await;
        return Err(MergeError::EmptyOutput(output_path.to_path_buf()));
    }

    for path in inputs {
        if let Err(source) = tokio::fs::remove_file(path).await {
            discard(output_path).await;
            return Err(MergeError::RemoveInput {
                path: path.clone(),
                source,
            });
        }
    }

    Ok(size)
}
