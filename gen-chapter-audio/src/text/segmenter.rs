//! Text segmentation for length-limited TTS backends.

use super::TextSegment;
use super::sentences::split_into_sentences;
use once_cell::sync::Lazy;
use regex::Regex;

/// Default per-request character ceiling.
pub const DEFAULT_MAX_SEGMENT_CHARS: usize = 4500;

/// Separator placed between paragraphs that share a segment.
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Separator placed between sentences packed from an oversized paragraph.
const SENTENCE_SEPARATOR: &str = " ";

/// Two or more line breaks, allowing blank lines that only hold spaces or tabs.
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\r?\n[ \t]*){2,}").expect("paragraph regex should compile"));

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Accumulates pieces of text into segments no longer than `max_chars`.
struct SegmentBuffer {
    separator: &'static str,
    max_chars: usize,
    current: String,
    current_len: usize,
    segments: Vec<String>,
}

impl SegmentBuffer {
    fn new(separator: &'static str, max_chars: usize) -> Self {
        Self {
            separator,
            max_chars,
            current: String::new(),
            current_len: 0,
            segments: Vec::new(),
        }
    }

    /// Whether `len` more characters (plus a separator) would overflow the buffer.
    fn would_overflow(&self, len: usize) -> bool {
        !self.current.is_empty() && self.current_len + char_len(self.separator) + len > self.max_chars
    }

    fn append(&mut self, piece: &str, len: usize) {
        if !self.current.is_empty() {
            self.current.push_str(self.separator);
            self.current_len += char_len(self.separator);
        }
        self.current.push_str(piece);
        self.current_len += len;
    }

    /// Add a piece, starting a new segment first if it would not fit.
    fn push(&mut self, piece: &str, len: usize) {
        if self.would_overflow(len) {
            self.flush();
        }
        self.append(piece, len);
    }

    fn flush(&mut self) {
        let trimmed = self.current.trim();
        if !trimmed.is_empty() {
            self.segments.push(trimmed.to_string());
        }
        self.current.clear();
        self.current_len = 0;
    }

    fn into_segments(mut self) -> Vec<String> {
        self.flush();
        self.segments
    }
}

/// Split text into segments of at most `max_chars` characters.
///
/// Paragraph breaks (blank lines) are preferred. A paragraph that is too long
/// on its own is split into sentences which are packed greedily. A single
/// sentence longer than `max_chars` is kept whole rather than cut mid-word, so
/// it is the one case where a segment exceeds the ceiling.
///
/// # Arguments
/// * `text` - Cleaned chapter text
/// * `max_chars` - Maximum segment length in characters
///
/// # Returns
/// Trimmed, non-empty segments in source order. Empty for blank input.
pub fn segment(text: &str, max_chars: usize) -> Vec<String> {
    if char_len(text) <= max_chars {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        return vec![trimmed.to_string()];
    }

    let mut chunk = SegmentBuffer::new(PARAGRAPH_SEPARATOR, max_chars);

    for paragraph in PARAGRAPH_BREAK.split(text) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        let len = char_len(paragraph);
        if len > max_chars {
            chunk.flush();
            chunk.segments.extend(pack_sentences(paragraph, max_chars));
        } else {
            chunk.push(paragraph, len);
        }
    }

    chunk.into_segments()
}

/// Pack the sentences of one oversized paragraph into segments.
fn pack_sentences(paragraph: &str, max_chars: usize) -> Vec<String> {
    let mut sub_chunk = SegmentBuffer::new(SENTENCE_SEPARATOR, max_chars);

    for sentence in split_into_sentences(paragraph) {
        let len = char_len(&sentence);
        sub_chunk.push(&sentence, len);
    }

    sub_chunk.into_segments()
}

/// Segment a chapter's text into indexed `TextSegment`s.
pub fn segment_chapter(text: &str, max_chars: usize) -> Vec<TextSegment> {
    segment(text, max_chars)
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextSegment::new(index, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// A paragraph of roughly `len` characters made of short sentences.
    fn paragraph(len: usize) -> String {
        let sentence = "The tide rolled in over the grey stones. ";
        let mut text = sentence.repeat(len / sentence.len() + 1);
        text.truncate(len);
        text.trim_end().to_string()
    }

    fn non_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_short_text_single_segment() {
        let text = paragraph(3000);
        let segments = segment(&text, DEFAULT_MAX_SEGMENT_CHARS);
        assert_eq!(segments, vec![text]);
    }

    #[test]
    fn test_short_text_is_trimmed() {
        let segments = segment("  \n Hello world. \n\n", 100);
        assert_eq!(segments, vec!["Hello world."]);
    }

    #[test]
    fn test_short_text_keeps_paragraphs() {
        let text = "First paragraph.\n\nSecond paragraph.";
        assert_eq!(segment(text, 100), vec![text]);
    }

    #[test]
    fn test_empty_text() {
        assert!(segment("", 100).is_empty());
        assert!(segment("   \n\n   ", 100).is_empty());
    }

    #[test]
    fn test_two_paragraphs_split_at_break() {
        let first = paragraph(3000);
        let second = paragraph(2990);
        let text = format!("{}\n\n{}", first, second);

        let segments = segment(&text, DEFAULT_MAX_SEGMENT_CHARS);
        assert_eq!(segments, vec![first, second]);
    }

    #[test]
    fn test_small_paragraphs_are_grouped() {
        let text = "One one one.\n\nTwo two two.\n\nThree three three.\n\nFour four four.";
        let segments = segment(text, 30);
        assert_eq!(
            segments,
            vec![
                "One one one.\n\nTwo two two.",
                "Three three three.",
                "Four four four."
            ]
        );
        assert!(segments.iter().all(|s| char_len(s) <= 30));
    }

    #[test]
    fn test_blank_lines_with_spaces_break_paragraphs() {
        let text = "Alpha alpha alpha.\n   \n\tBeta beta beta.\r\n\r\nGamma gamma gamma.";
        let segments = segment(text, 20);
        assert_eq!(
            segments,
            vec!["Alpha alpha alpha.", "Beta beta beta.", "Gamma gamma gamma."]
        );
    }

    #[test]
    fn test_single_newlines_do_not_break_paragraphs() {
        let text = "Line one here.\nLine two here.\nLine three here.";
        let segments = segment(text, 30);
        // One paragraph over the ceiling, so it is split by sentence
        assert_eq!(
            segments,
            vec!["Line one here. Line two here.", "Line three here."]
        );
    }

    #[test]
    fn test_oversized_paragraph_split_by_sentence() {
        let big = paragraph(10_000);
        let segments = segment(&big, DEFAULT_MAX_SEGMENT_CHARS);
        assert!(segments.len() >= 3);
        for s in &segments {
            assert!(char_len(s) <= DEFAULT_MAX_SEGMENT_CHARS, "Segment too long: {}", char_len(s));
        }
        assert_eq!(
            non_whitespace(&segments.concat()),
            non_whitespace(&big)
        );
    }

    #[test]
    fn test_oversized_paragraph_flushes_pending_chunk() {
        let text = format!("Short intro.\n\n{}\n\nShort outro.", paragraph(200));
        let segments = segment(&text, 100);
        assert_eq!(segments.first().map(String::as_str), Some("Short intro."));
        assert_eq!(segments.last().map(String::as_str), Some("Short outro."));
        assert!(segments.iter().all(|s| char_len(s) <= 100));
    }

    #[test]
    fn test_unpunctuated_paragraph_kept_whole() {
        // 2000 words, 9999 chars, no sentence boundary anywhere
        let text = vec!["word"; 2000].join(" ");
        let segments = segment(&text, DEFAULT_MAX_SEGMENT_CHARS);
        assert_eq!(segments, vec![text]);
    }

    #[test]
    fn test_long_sentence_among_short_ones() {
        let long_sentence = format!("{}.", vec!["on"; 40].join(" "));
        let text = format!("Before it. {} After it.", long_sentence);
        let segments = segment(&text, 50);
        assert_eq!(segments, vec!["Before it.", long_sentence.as_str(), "After it."]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 12 chars but 24 bytes
        let text = "ééééé. éééé.";
        assert_eq!(segment(text, 12), vec![text]);
        assert_eq!(segment(text, 11), vec!["ééééé.", "éééé."]);
    }

    #[test]
    fn test_segment_chapter_indexes() {
        let text = "One one one.\n\nTwo two two.\n\nThree three three.";
        let segments = segment_chapter(text, 15);
        assert_eq!(segments.len(), 3);
        for (i, s) in segments.iter().enumerate() {
            assert_eq!(s.index, i);
        }
        assert_eq!(segments[2].text, "Three three three.");
    }

    fn arb_text() -> impl Strategy<Value = String> {
        let word = "[a-zA-Z]{1,12}";
        let sentence = prop::collection::vec(word, 1..15)
            .prop_flat_map(|words| {
                (Just(words.join(" ")), prop::sample::select(vec![".", "!", "?", ""]))
            })
            .prop_map(|(body, end)| format!("{}{}", body, end));
        let paragraph = prop::collection::vec(sentence, 1..12).prop_map(|s| s.join(" "));
        prop::collection::vec(paragraph, 1..8).prop_map(|p| p.join("\n\n"))
    }

    proptest! {
        #[test]
        fn prop_short_text_returns_trimmed_input(text in arb_text()) {
            let max = char_len(&text) + 10;
            prop_assert_eq!(segment(&text, max), vec![text.trim().to_string()]);
        }

        #[test]
        fn prop_segments_respect_ceiling(text in arb_text(), max in 20usize..200) {
            for s in segment(&text, max) {
                prop_assert!(!s.trim().is_empty());
                if char_len(&s) > max {
                    // Only a single oversized sentence may break the ceiling
                    prop_assert_eq!(split_into_sentences(&s).len(), 1, "segment: {:?}", s);
                }
            }
        }

        #[test]
        fn prop_no_content_lost_or_duplicated(text in arb_text(), max in 20usize..200) {
            let segments = segment(&text, max);
            prop_assert_eq!(non_whitespace(&segments.concat()), non_whitespace(&text));
        }
    }
}
