//! Serde wire types for the Google Speech-to-Text v1 REST API.
//!
//! Only the fields this tool actually touches are modelled; the API sends
//! more, and `serde` ignores the rest.

use serde::{Deserialize, Serialize};

use crate::config::GcpConfig;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// `RecognitionConfig` — how the API should interpret the audio.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    pub encoding: String,
    pub sample_rate_hertz: u32,
    pub language_code: String,
    pub enable_automatic_punctuation: bool,
}

impl RecognitionConfig {
    /// Build the request config from application settings.
    pub fn from_config(config: &GcpConfig) -> Self {
        Self {
            encoding: config.encoding.clone(),
            sample_rate_hertz: config.sample_rate_hertz,
            language_code: config.language_code.clone(),
            enable_automatic_punctuation: config.enable_automatic_punctuation,
        }
    }
}

/// `RecognitionAudio` — where the audio lives (always a GCS URI here).
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionAudio {
    pub uri: String,
}

/// Body of a `speech:longrunningrecognize` request.
#[derive(Debug, Clone, Serialize)]
pub struct LongRunningRecognizeRequest {
    pub config: RecognitionConfig,
    pub audio: RecognitionAudio,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A long-running operation as returned by `operations.get` (and by the
/// initial `longrunningrecognize` call, which returns it with `done: false`
/// and no response).
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    /// Server-assigned operation name, used for polling.
    pub name: String,
    #[serde(default)]
    pub done: bool,
    /// Populated when the operation finished with an error.
    pub error: Option<OperationStatus>,
    /// Populated when the operation finished successfully.
    pub response: Option<LongRunningRecognizeResponse>,
}

/// `google.rpc.Status` carried by a failed operation.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LongRunningRecognizeResponse {
    #[serde(default)]
    pub results: Vec<SpeechRecognitionResult>,
}

/// One consecutive portion of the audio.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechRecognitionResult {
    #[serde(default)]
    pub alternatives: Vec<SpeechRecognitionAlternative>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechRecognitionAlternative {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub confidence: f32,
}

impl LongRunningRecognizeResponse {
    /// Join the most likely alternative of every result into one transcript.
    ///
    /// Each result covers a consecutive portion of the audio, so plain
    /// newline joining preserves the spoken order.  Per-portion confidences
    /// are logged at debug level rather than stored.
    pub fn joined_transcript(&self) -> String {
        let mut parts = Vec::with_capacity(self.results.len());
        for result in &self.results {
            if let Some(best) = result.alternatives.first() {
                log::debug!(
                    "transcript portion ({} chars, confidence {:.3})",
                    best.transcript.len(),
                    best.confidence
                );
                parts.push(best.transcript.trim());
            }
        }
        parts.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognition_config_serialises_camel_case() {
        let config = RecognitionConfig::from_config(&GcpConfig::default());
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["encoding"], "LINEAR16");
        assert_eq!(json["sampleRateHertz"], 16_000);
        assert_eq!(json["languageCode"], "es-419");
        assert_eq!(json["enableAutomaticPunctuation"], true);
    }

    #[test]
    fn operation_parses_running_state() {
        let raw = r#"{ "name": "operations/12345" }"#;
        let op: Operation = serde_json::from_str(raw).unwrap();
        assert_eq!(op.name, "operations/12345");
        assert!(!op.done);
        assert!(op.response.is_none());
        assert!(op.error.is_none());
    }

    #[test]
    fn operation_parses_done_state_with_results() {
        let raw = r#"{
            "name": "operations/12345",
            "done": true,
            "response": {
                "results": [
                    { "alternatives": [ { "transcript": "hola mundo", "confidence": 0.92 } ] },
                    { "alternatives": [ { "transcript": "segunda parte", "confidence": 0.88 } ] }
                ]
            }
        }"#;
        let op: Operation = serde_json::from_str(raw).unwrap();
        assert!(op.done);
        let response = op.response.unwrap();
        assert_eq!(response.joined_transcript(), "hola mundo\nsegunda parte");
    }

    #[test]
    fn operation_parses_error_state() {
        let raw = r#"{
            "name": "operations/12345",
            "done": true,
            "error": { "code": 3, "message": "invalid audio" }
        }"#;
        let op: Operation = serde_json::from_str(raw).unwrap();
        let error = op.error.unwrap();
        assert_eq!(error.code, 3);
        assert_eq!(error.message, "invalid audio");
    }

    #[test]
    fn joined_transcript_skips_results_without_alternatives() {
        let response = LongRunningRecognizeResponse {
            results: vec![
                SpeechRecognitionResult {
                    alternatives: vec![SpeechRecognitionAlternative {
                        transcript: "uno".into(),
                        confidence: 0.9,
                    }],
                },
                SpeechRecognitionResult { alternatives: vec![] },
            ],
        };
        assert_eq!(response.joined_transcript(), "uno");
    }
}
