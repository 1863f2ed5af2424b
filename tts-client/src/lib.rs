//! Speech synthesis client library for the chapter-audio workspace
//!
//! Provides a single interface over text-to-speech backends:
//! - Google Cloud Text-to-Speech (REST)
//! - Mock (deterministic, for tests and dry runs)

pub mod config;
pub mod error;
pub mod providers;
pub mod synthesizer;

pub use config::ProviderConfig;
pub use error::{Result, TtsError};
pub use providers::{GoogleTtsProvider, MockSynthesizer, ProviderKind, get_provider};
pub use synthesizer::{AudioEncoding, SpeechSynthesizer, SynthesisConfig};
