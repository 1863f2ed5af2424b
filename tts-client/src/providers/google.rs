//! Google Cloud Text-to-Speech provider
//!
//! Direct HTTP implementation of the `text:synthesize` REST endpoint.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TtsError};
use crate::synthesizer::{SpeechSynthesizer, SynthesisConfig};

const GOOGLE_TTS_BASE_URL: &str = "https://texttospeech.googleapis.com/v1";

/// Provider for Google Cloud Text-to-Speech
pub struct GoogleTtsProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl GoogleTtsProvider {
    /// Create a new provider, optionally against a custom base URL
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| GOOGLE_TTS_BASE_URL.to_string()),
            client: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/text:synthesize", self.base_url)
    }
}

// Google TTS request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
    pitch: f32,
    volume_gain_db: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn build_request<'a>(text: &'a str, config: &'a SynthesisConfig) -> SynthesizeRequest<'a> {
    SynthesizeRequest {
        input: SynthesisInput { text },
        voice: VoiceSelection {
            language_code: &config.language_code,
            name: config.voice.as_deref(),
        },
        audio_config: AudioConfig {
            audio_encoding: config.encoding.api_name(),
            speaking_rate: config.speaking_rate,
            pitch: config.pitch,
            volume_gain_db: config.volume_gain_db,
        },
    }
}

fn decode_audio(response: SynthesizeResponse) -> Result<Vec<u8>> {
    let content = response
        .audio_content
        .filter(|c| !c.is_empty())
        .ok_or(TtsError::EmptyAudio)?;
    let audio = STANDARD.decode(content.as_bytes())?;
    if audio.is_empty() {
        return Err(TtsError::EmptyAudio);
    }
    Ok(audio)
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsProvider {
    async fn synthesize(&self, text: &str, config: &SynthesisConfig) -> Result<Vec<u8>> {
        let request = build_request(text, config);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| TtsError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                return Err(TtsError::RateLimited { retry_after });
            }

            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    error_response.error.message
                } else {
                    error_text
                };

            return Err(TtsError::ApiError {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        let api_response: SynthesizeResponse =
            response.json().await.map_err(|e| TtsError::ApiError {
                message: format!("Failed to parse response: {}", e),
                status_code: None,
            })?;

        let audio = decode_audio(api_response)?;
        log::debug!(
            "google tts: {} chars -> {} bytes ({})",
            text.chars().count(),
            audio.len(),
            config.encoding.api_name()
        );
        Ok(audio)
    }

    fn name(&self) -> &'static str {
        "google"
    }

    fn is_available(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(TtsError::ConfigError("Google TTS API key is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesizer::AudioEncoding;

    #[test]
    fn test_request_shape() {
        let config = SynthesisConfig::new()
            .with_voice("en-US-Neural2-D")
            .with_encoding(AudioEncoding::OggOpus)
            .with_speaking_rate(1.25);
        let request = build_request("Hello there.", &config);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["input"]["text"], "Hello there.");
        assert_eq!(json["voice"]["languageCode"], "en-US");
        assert_eq!(json["voice"]["name"], "en-US-Neural2-D");
        assert_eq!(json["audioConfig"]["audioEncoding"], "OGG_OPUS");
        assert_eq!(json["audioConfig"]["speakingRate"], 1.25);
        assert_eq!(json["audioConfig"]["volumeGainDb"], 0.0);
    }

    #[test]
    fn test_voice_name_omitted_when_unset() {
        let config = SynthesisConfig::default();
        let json = serde_json::to_value(build_request("Hi.", &config)).unwrap();
        assert!(json["voice"].get("name").is_none());
    }

    #[test]
    fn test_decode_audio() {
        let response: SynthesizeResponse =
            serde_json::from_str(r#"{"audioContent": "SUQzBAA="}"#).unwrap();
        assert_eq!(decode_audio(response).unwrap(), b"ID3\x04\x00");
    }

    #[test]
    fn test_missing_audio_is_an_error() {
        let response: SynthesizeResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(decode_audio(response), Err(TtsError::EmptyAudio)));

        let response: SynthesizeResponse =
            serde_json::from_str(r#"{"audioContent": ""}"#).unwrap();
        assert!(matches!(decode_audio(response), Err(TtsError::EmptyAudio)));
    }

    #[test]
    fn test_invalid_base64_is_an_error() {
        let response: SynthesizeResponse =
            serde_json::from_str(r#"{"audioContent": "not base64!"}"#).unwrap();
        assert!(matches!(decode_audio(response), Err(TtsError::Decode(_))));
    }

    #[test]
    fn test_custom_base_url() {
        let provider =
            GoogleTtsProvider::new("key".to_string(), Some("http://localhost:8080/v1/".into()));
        assert_eq!(provider.endpoint(), "http://localhost:8080/v1/text:synthesize");
        assert!(provider.is_available().is_ok());
    }
}
