//! Chapter audio builds: segment, synthesize, reassemble.
//!
//! A build takes one chapter of cleaned text and produces exactly one audio
//! file, `<output_dir>/<base_name>.<ext>`. Text that fits in a single request
//! is synthesized straight into the artifact. Longer text is segmented,
//! synthesized part by part into the working directory, and the parts are
//! concatenated without re-encoding.
//!
//! The artifact is staged under a temporary name and renamed into place only
//! once it is complete, so a failed build never leaves a partial file at the
//! target path.

use crate::audio::{self, AudioMerger};
use crate::error::BuildError;
use crate::synth::{self, PartFiles};
use crate::text::{self, TextSegment};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempPath;
use tts_client::{AudioEncoding, SpeechSynthesizer, SynthesisConfig};

/// Mode of finished artifacts before the umask is applied.
#[cfg(unix)]
const ARTIFACT_MODE: u32 = 0o644;

/// How an artifact was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// One synthesis call, no merge
    Direct,
    /// Several synthesis calls followed by a merge
    Chunked,
}

/// A finished audio file.
#[derive(Debug, Clone, Serialize)]
pub struct AudioArtifact {
    /// File name within the output directory
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Number of text segments synthesized
    pub segments: usize,
    pub mode: BuildMode,
    pub created_at: DateTime<Utc>,
}

/// Directories and limits for builds.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Per-request character ceiling of the synthesis backend
    pub max_segment_chars: usize,
    /// Where part files are staged
    pub work_dir: PathBuf,
    /// Where artifacts are written
    pub output_dir: PathBuf,
}

impl BuildOptions {
    pub fn new(work_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            max_segment_chars: text::segmenter::DEFAULT_MAX_SEGMENT_CHARS,
            work_dir: work_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn with_max_segment_chars(mut self, max_segment_chars: usize) -> Self {
        self.max_segment_chars = max_segment_chars.max(1);
        self
    }
}

/// Builds chapter audio artifacts from text.
///
/// Holds no per-build state, so independent builds may run concurrently.
/// Concurrent builds of the same base name race and the last one wins.
pub struct ChapterAudioBuilder {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    merger: Arc<dyn AudioMerger>,
    options: BuildOptions,
}

fn io_error(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> BuildError {
    let context = context.into();
    move |source| BuildError::Io { context, source }
}

fn validate_base_name(base_name: &str) -> Result<(), BuildError> {
    let invalid = base_name.trim().is_empty()
        || base_name.contains(['/', '\\'])
        || base_name == "."
        || base_name == "..";
    if invalid {
        return Err(BuildError::InvalidBaseName(base_name.to_string()));
    }
    Ok(())
}

impl ChapterAudioBuilder {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        merger: Arc<dyn AudioMerger>,
        options: BuildOptions,
    ) -> Self {
        Self {
            synthesizer,
            merger,
            options,
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Where the artifact for `base_name` is written.
    pub fn artifact_path(&self, base_name: &str, encoding: AudioEncoding) -> PathBuf {
        self.options
            .output_dir
            .join(format!("{}.{}", base_name, encoding.extension()))
    }

    /// Build the artifact for one chapter.
    ///
    /// See [`ChapterAudioBuilder::build_with_progress`].
    pub async fn build(
        &self,
        title: &str,
        text: &str,
        base_name: &str,
        config: &SynthesisConfig,
    ) -> Result<AudioArtifact, BuildError> {
        self.build_with_progress(title, text, base_name, config, |_, _| {})
            .await
    }

    /// Build the artifact for one chapter, reporting `(completed, total)`
    /// segments as synthesis proceeds.
    ///
    /// Building the same `base_name` again replaces the previous artifact
    /// wholesale. On error no artifact is written and no part files remain.
    pub async fn build_with_progress<F>(
        &self,
        title: &str,
        text: &str,
        base_name: &str,
        config: &SynthesisConfig,
        mut on_progress: F,
    ) -> Result<AudioArtifact, BuildError>
    where
        F: FnMut(usize, usize),
    {
        if text.trim().is_empty() {
            return Err(BuildError::EmptyText);
        }
        validate_base_name(base_name)?;

        let segments = text::segment_chapter(text, self.options.max_segment_chars);
        let mode = if segments.len() == 1 {
            BuildMode::Direct
        } else {
            BuildMode::Chunked
        };

        log::info!(
            "building \"{}\" as {}: {} chars, {} segment(s) via {}",
            title,
            base_name,
            text.chars().count(),
            segments.len(),
            self.synthesizer.name()
        );

        tokio::fs::create_dir_all(&self.options.output_dir)
            .await
            .map_err(io_error(format!(
                "failed to create output directory {}",
                self.options.output_dir.display()
            )))?;

        let staging = self.staging_path(base_name, config.encoding)?;

        match mode {
            BuildMode::Direct => {
                self.build_direct(&segments[0], config, &staging).await?;
                on_progress(1, 1);
            }
            BuildMode::Chunked => {
                self.build_chunked(&segments, base_name, config, &staging, &mut on_progress)
                    .await?;
            }
        }

        let target = self.artifact_path(base_name, config.encoding);
        staging.persist(&target).map_err(|e| BuildError::Io {
            context: format!("failed to move artifact into place at {}", target.display()),
            source: e.error,
        })?;

        let size_bytes = tokio::fs::metadata(&target)
            .await
            .map_err(io_error(format!("failed to stat {}", target.display())))?
            .len();

        log::info!(
            "built {} ({} bytes, {:?})",
            target.display(),
            size_bytes,
            mode
        );

        Ok(AudioArtifact {
            name: format!("{}.{}", base_name, config.encoding.extension()),
            path: target,
            size_bytes,
            segments: segments.len(),
            mode,
            created_at: Utc::now(),
        })
    }

    /// Temporary file next to the target, deleted unless persisted.
    ///
    /// Created with the regular artifact mode; tempfile defaults to
    /// owner-only and the rename keeps whatever mode the file has.
    fn staging_path(&self, base_name: &str, encoding: AudioEncoding) -> Result<TempPath, BuildError> {
        let prefix = format!(".{}-", base_name);
        let suffix = format!(".{}", encoding.extension());
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).suffix(&suffix);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(ARTIFACT_MODE));
        }
        builder
            .tempfile_in(&self.options.output_dir)
            .map(|f| f.into_temp_path())
            .map_err(io_error(format!(
                "failed to create staging file in {}",
                self.options.output_dir.display()
            )))
    }

    async fn build_direct(
        &self,
        segment: &TextSegment,
        config: &SynthesisConfig,
        staging: &Path,
    ) -> Result<(), BuildError> {
        synth::synthesize_to_file(self.synthesizer.as_ref(), &segment.text, config, staging)
            .await
            .map_err(|e| e.into_build_error(segment.part(), 1, staging))?;
        Ok(())
    }

    async fn build_chunked<F>(
        &self,
        segments: &[TextSegment],
        base_name: &str,
        config: &SynthesisConfig,
        staging: &Path,
        on_progress: &mut F,
    ) -> Result<(), BuildError>
    where
        F: FnMut(usize, usize),
    {
        tokio::fs::create_dir_all(&self.options.work_dir)
            .await
            .map_err(io_error(format!(
                "failed to create working directory {}",
                self.options.work_dir.display()
            )))?;

        // Dropping the guard removes any parts still on disk
        let mut parts = PartFiles::new();

        synth::synthesize_segments(
            self.synthesizer.as_ref(),
            segments,
            config,
            &self.options.work_dir,
            base_name,
            &mut parts,
            |done, total| on_progress(done, total),
        )
        .await?;

        audio::concatenate(self.merger.as_ref(), parts.paths(), staging).await?;
        Ok(())
    }
}
