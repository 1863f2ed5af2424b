//! Mock speech synthesizer for testing
//!
//! Produces deterministic audio bytes derived from the input text and can be
//! told to fail, or to return an empty payload, on a specific call.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, TtsError};
use crate::synthesizer::{SpeechSynthesizer, SynthesisConfig};

/// Header prepended to every mock payload
const MOCK_HEADER: &[u8] = b"MOCKAUDIO:";

/// A mock synthesizer for exercising chunked builds without a backend
pub struct MockSynthesizer {
    /// Current call count
    call_count: AtomicUsize,
    /// 1-based call that fails with an API error
    fail_on_call: Option<usize>,
    /// 1-based call that returns an empty payload
    empty_on_call: Option<usize>,
    /// Texts received, in call order
    calls: Mutex<Vec<String>>,
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSynthesizer {
    /// Create a synthesizer that always succeeds
    pub fn new() -> Self {
        Self {
            call_count: AtomicUsize::new(0),
            fail_on_call: None,
            empty_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a synthesizer whose `n`th call (1-based) fails
    pub fn fails_on_call(n: usize) -> Self {
        Self {
            fail_on_call: Some(n),
            ..Self::new()
        }
    }

    /// Create a synthesizer whose `n`th call (1-based) returns no audio
    pub fn empty_on_call(n: usize) -> Self {
        Self {
            empty_on_call: Some(n),
            ..Self::new()
        }
    }

    /// Get the number of times synthesize() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Texts passed to synthesize(), in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// The payload this mock returns for `text`
    pub fn audio_for(text: &str) -> Vec<u8> {
        let mut audio = Vec::with_capacity(MOCK_HEADER.len() + text.len());
        audio.extend_from_slice(MOCK_HEADER);
        audio.extend_from_slice(text.as_bytes());
        audio
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, _config: &SynthesisConfig) -> Result<Vec<u8>> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().unwrap().push(text.to_string());

        if self.fail_on_call == Some(call_num) {
            return Err(TtsError::ApiError {
                message: format!("mock failure on call {}", call_num),
                status_code: Some(500),
            });
        }

        if self.empty_on_call == Some(call_num) {
            return Ok(Vec::new());
        }

        Ok(Self::audio_for(text))
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}
