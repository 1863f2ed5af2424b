//! Sequential per-segment synthesis into staged part files.

use crate::error::BuildError;
use crate::text::TextSegment;
use std::path::{Path, PathBuf};
use tts_client::{AudioEncoding, SpeechSynthesizer, SynthesisConfig, TtsError};

/// File name of a staged part: `<base>-part<N>.<ext>` with a 1-based `N`.
pub fn part_file_name(base_name: &str, part: usize, encoding: AudioEncoding) -> String {
    format!("{}-part{}.{}", base_name, part, encoding.extension())
}

/// Staged part files of one build.
///
/// Every file registered here is removed when the guard is dropped, so parts
/// never outlive the build on any exit path. Files already consumed by the
/// reassembler are skipped.
#[derive(Debug, Default)]
pub struct PartFiles {
    paths: Vec<PathBuf>,
}

impl PartFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a part before it is written.
    fn register(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Staged parts in segment order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for PartFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => log::debug!("removed part file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("failed to remove part file {}: {}", path.display(), e),
            }
        }
    }
}

/// Synthesize one piece of text and write the payload to `output_path`.
///
/// An empty payload is treated as a synthesis failure.
pub async fn synthesize_to_file(
    synthesizer: &dyn SpeechSynthesizer,
    text: &str,
    config: &SynthesisConfig,
    output_path: &Path,
) -> Result<u64, SegmentFailure> {
    let audio = synthesizer
        .synthesize(text, config)
        .await
        .map_err(SegmentFailure::Synthesis)?;

    if audio.is_empty() {
        return Err(SegmentFailure::Synthesis(TtsError::EmptyAudio));
    }

    tokio::fs::write(output_path, &audio)
        .await
        .map_err(SegmentFailure::Write)?;

    Ok(audio.len() as u64)
}

/// Why a single segment could not be staged.
#[derive(Debug)]
pub enum SegmentFailure {
    Synthesis(TtsError),
    Write(std::io::Error),
}

impl SegmentFailure {
    /// Attach the segment position and staged path to the failure.
    pub fn into_build_error(self, part: usize, total: usize, path: &Path) -> BuildError {
        match self {
            Self::Synthesis(source) => BuildError::Synthesis {
                part,
                total,
                source,
            },
            Self::Write(source) => BuildError::Io {
                context: format!(
                    "failed to write audio for segment {}/{} to {}",
                    part,
                    total,
                    path.display()
                ),
                source,
            },
        }
    }
}

/// Synthesize every segment in order, staging each payload in `work_dir`.
///
/// Calls are issued one at a time. The first failure stops the run; parts
/// written so far stay registered in `parts` and are cleaned up when the
/// caller drops it.
///
/// # Arguments
/// * `synthesizer` - Backend to call once per segment
/// * `segments` - Segments in source order
/// * `config` - Voice settings shared by every call
/// * `work_dir` - Directory for part files
/// * `base_name` - Artifact base name used to name the parts
/// * `parts` - Receives the staged part paths in order
/// * `on_progress` - Called with `(completed, total)` after each segment
pub async fn synthesize_segments<F>(
    synthesizer: &dyn SpeechSynthesizer,
    segments: &[TextSegment],
    config: &SynthesisConfig,
    work_dir: &Path,
    base_name: &str,
    parts: &mut PartFiles,
    mut on_progress: F,
) -> Result<(), BuildError>
where
    F: FnMut(usize, usize),
{
    let total = segments.len();

    for segment in segments {
        let part = segment.part();
        let path = work_dir.join(part_file_name(base_name, part, config.encoding));
        parts.register(path.clone());

        log::debug!(
            "synthesizing segment {}/{} ({} chars) -> {}",
            part,
            total,
            segment.char_len(),
            path.display()
        );

        let bytes = synthesize_to_file(synthesizer, &segment.text, config, &path)
            .await
            .map_err(|e| e.into_build_error(part, total, &path))?;

        log::debug!("segment {}/{}: {} bytes", part, total, bytes);
        on_progress(part, total);
    }

    Ok(())
}
