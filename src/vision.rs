//! Gesture classification boundary.
//!
//! The simulation never talks to the network directly; it sees only the
//! [`GestureClassifier`] capability: hand in a JPEG, get back a
//! [`VisionResponse`]. The call is total: transport failures, HTTP errors,
//! and malformed payloads all degrade to a no-op command with zero
//! confidence and a diagnostic reasoning string, never a fault in the
//! render loop.
//!
//! [`GeminiClassifier`] is the real HTTP-backed implementation;
//! [`ScriptedClassifier`] replays canned responses for tests and demos.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::warn;

use crate::command::VisionResponse;
use crate::config::VisionConfig;
use crate::error::{FlowError, Result};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Diagnostic text reported when a classification round fails outright.
pub const CLASSIFY_FAILURE_REASON: &str = "Error analyzing image";

const GESTURE_PROMPT: &str = "\
Analyze the hand gesture in this image and map it to a particle system command.

Mapping Rules:
- \"Open Palm\" or \"High Five\" -> SWITCH_NATURE (Green/Flowers)
- \"Fist\" or \"Punch\" -> SWITCH_FIRE (Red/Explosive)
- \"Peace Sign\" or \"V Sign\" -> SWITCH_GALAXY (Space/Stars)
- \"Heart Shape\" (with hands) or \"Love Sign\" -> SWITCH_LOVE (Pink/Hearts)
- \"Thumbs Up\" or Neutral -> RESET (Default Blue)

Return JSON only.";

/// Capability interface for gesture classification.
///
/// `classify` must be total: implementations absorb their own failures and
/// return [`VisionResponse::failure`] instead of propagating them.
pub trait GestureClassifier: Send + Sync {
    /// Classifier name for logging (e.g. "gemini", "scripted").
    fn name(&self) -> &str;

    /// Classify the gesture in a JPEG-encoded still image.
    fn classify(&self, jpeg: &[u8]) -> VisionResponse;
}

/// Gesture classifier backed by the Gemini generateContent API.
pub struct GeminiClassifier {
    api_key: String,
    api_url: String,
    model: String,
}

impl GeminiClassifier {
    /// Create a classifier from config.
    pub fn from_config(config: &VisionConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            FlowError::Classifier(
                "API key not configured. Set FLOWFIELD_API_KEY or add it to flowfield.toml"
                    .to_string(),
            )
        })?;

        Ok(Self {
            api_key,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
        })
    }

    fn request(&self, jpeg: &[u8]) -> Result<VisionResponse> {
        let payload = serde_json::json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": "image/jpeg",
                            "data": BASE64.encode(jpeg)
                        }
                    },
                    { "text": GESTURE_PROMPT }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "command": {
                            "type": "STRING",
                            "enum": [
                                "SWITCH_FIRE",
                                "SWITCH_GALAXY",
                                "SWITCH_NATURE",
                                "SWITCH_LOVE",
                                "RESET",
                                "NONE"
                            ]
                        },
                        "confidence": { "type": "NUMBER" },
                        "reasoning": { "type": "STRING" }
                    },
                    "required": ["command", "confidence", "reasoning"]
                }
            }
        });

        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);
        let body = self.post_json_with_retry(&url, &payload)?;
        parse_gesture_response(&body)
    }

    fn post_json_with_retry(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        for attempt in 0..MAX_RETRIES {
            let agent = build_agent();
            let response = agent
                .post(url)
                .header("x-goog-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .send_json(payload);

            match response {
                Ok(mut ok) => {
                    return ok.body_mut().read_json().map_err(|e| {
                        FlowError::Classifier(format!("failed to read classifier response: {}", e))
                    });
                }
                Err(e) => {
                    if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(FlowError::Classifier(format!(
                        "classifier request failed: {}",
                        e
                    )));
                }
            }
        }

        Err(FlowError::Classifier(
            "classifier request failed after retries".to_string(),
        ))
    }
}

impl GestureClassifier for GeminiClassifier {
    fn name(&self) -> &str {
        "gemini"
    }

    fn classify(&self, jpeg: &[u8]) -> VisionResponse {
        match self.request(jpeg) {
            Ok(response) => response,
            Err(e) => {
                warn!("gesture classification failed: {}", e);
                VisionResponse::failure(CLASSIFY_FAILURE_REASON)
            }
        }
    }
}

/// Extract the [`VisionResponse`] from a generateContent reply body.
///
/// The model returns its JSON as text inside the first candidate part.
pub fn parse_gesture_response(body: &serde_json::Value) -> Result<VisionResponse> {
    let text = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .and_then(|a| a.first())
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| {
            FlowError::Classifier("no candidate text in classifier response".to_string())
        })?;

    serde_json::from_str(text)
        .map_err(|e| FlowError::Classifier(format!("malformed gesture payload: {}", e)))
}

fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .build();
    config.into()
}

fn is_retryable_error(e: &ureq::Error) -> bool {
    match e {
        ureq::Error::Timeout(_)
        | ureq::Error::Io(_)
        | ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound => true,
        ureq::Error::StatusCode(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
        _ => false,
    }
}

fn sleep_backoff(attempt: usize) {
    let delay_ms = RETRY_BASE_DELAY_MS.saturating_mul(1u64 << attempt);
    std::thread::sleep(Duration::from_millis(delay_ms));
}

/// Deterministic classifier replaying a fixed script of responses.
///
/// Each call pops the next response; an exhausted script reports the same
/// degraded result a failed classification would.
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<VisionResponse>>,
}

impl ScriptedClassifier {
    pub fn new(responses: impl IntoIterator<Item = VisionResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().collect()),
        }
    }

    /// Responses left in the script.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

impl GestureClassifier for ScriptedClassifier {
    fn name(&self) -> &str {
        "scripted"
    }

    fn classify(&self, _jpeg: &[u8]) -> VisionResponse {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| VisionResponse::failure(CLASSIFY_FAILURE_REASON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::GestureCommand;

    #[test]
    fn test_parse_gesture_response() {
        let body = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "text": "{\"command\":\"SWITCH_FIRE\",\"confidence\":0.9,\"reasoning\":\"fist detected\"}"
                    }],
                    "role": "model"
                },
                "finishReason": "STOP"
            }],
            "modelVersion": "gemini-2.5-flash"
        });

        let response = parse_gesture_response(&body).unwrap();
        assert_eq!(response.command, GestureCommand::SwitchFire);
        assert!((response.confidence - 0.9).abs() < 1e-6);
        assert_eq!(response.reasoning, "fist detected");
    }

    #[test]
    fn test_parse_gesture_response_no_candidates() {
        let body = serde_json::json!({ "error": { "code": 400 } });
        assert!(parse_gesture_response(&body).is_err());
    }

    #[test]
    fn test_parse_gesture_response_bad_payload() {
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "not json" }] } }]
        });
        assert!(parse_gesture_response(&body).is_err());
    }

    #[test]
    fn test_scripted_classifier_replays_then_degrades() {
        let classifier = ScriptedClassifier::new([VisionResponse::new(
            GestureCommand::SwitchLove,
            0.7,
            "heart hands",
        )]);

        let first = classifier.classify(&[]);
        assert_eq!(first.command, GestureCommand::SwitchLove);
        assert_eq!(classifier.remaining(), 0);

        let exhausted = classifier.classify(&[]);
        assert_eq!(exhausted.command, GestureCommand::None);
        assert_eq!(exhausted.confidence, 0.0);
        assert_eq!(exhausted.reasoning, CLASSIFY_FAILURE_REASON);
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let config = VisionConfig {
            api_key: None,
            ..VisionConfig::default()
        };
        assert!(GeminiClassifier::from_config(&config).is_err());
    }
}
