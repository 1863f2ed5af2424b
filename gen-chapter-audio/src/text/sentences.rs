//! Sentence splitting on terminal punctuation.

use once_cell::sync::Lazy;
use regex::Regex;

/// Terminal punctuation (with any closing quotes or brackets) followed by whitespace.
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([.!?]+["'\u{201D}\u{2019})\]]*)\s+"#).expect("sentence regex should compile")
});

/// Split text into sentences, keeping the punctuation with its sentence.
///
/// Text without any sentence boundary comes back as a single sentence.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for caps in SENTENCE_END.captures_iter(text) {
        let (Some(whole), Some(punct)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_sentence(&mut sentences, &text[start..punct.end()]);
        start = whole.end();
    }
    push_sentence(&mut sentences, &text[start..]);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, sentence: &str) {
    let sentence = sentence.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }
}
