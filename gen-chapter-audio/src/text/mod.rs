//! Text processing for TTS: segmenting, sentence splitting, and artifact naming.

mod naming;
pub mod segmenter;
mod sentences;

pub use naming::derive_base_name;
pub use segmenter::segment_chapter;

/// A segment of chapter text sized for one synthesis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    /// Position within the chapter (0-based)
    pub index: usize,
    /// The text content
    pub text: String,
}

impl TextSegment {
    /// Create a new text segment.
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }

    /// 1-based part number, as used in staged file names.
    pub fn part(&self) -> usize {
        self.index + 1
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
