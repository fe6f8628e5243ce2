//! Model request/response bodies for the Anthropic text-completion format.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Marker opening a human turn. Also the stop sequence.
pub const HUMAN_TURN: &str = "\n\nHuman:";
/// Marker opening the assistant turn the model should complete.
pub const ASSISTANT_TURN: &str = "\n\nAssistant:";

pub const MAX_TOKENS_TO_SAMPLE: u32 = 4096;
pub const TEMPERATURE: f64 = 0.5;
pub const TOP_K: u32 = 250;
pub const TOP_P: u32 = 1;

/// The JSON body sent to the model.
///
/// # Examples
///
/// ```
/// use lexbridge::llm::ModelRequest;
///
/// let req = ModelRequest::from_utterance("What is 2+2?");
/// assert_eq!(req.prompt, "\n\nHuman:What is 2+2?\n\nAssistant:");
/// assert_eq!(req.stop_sequences, vec!["\n\nHuman:".to_owned()]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRequest {
    pub prompt: String,
    pub max_tokens_to_sample: u32,
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: u32,
    pub stop_sequences: Vec<String>,
}

impl ModelRequest {
    /// Wraps the raw utterance in a single human/assistant exchange with
    /// the fixed sampling configuration.
    pub fn from_utterance(utterance: &str) -> Self {
        Self {
            prompt: format!("{HUMAN_TURN}{utterance}{ASSISTANT_TURN}"),
            max_tokens_to_sample: MAX_TOKENS_TO_SAMPLE,
            temperature: TEMPERATURE,
            top_k: TOP_K,
            top_p: TOP_P,
            stop_sequences: vec![HUMAN_TURN.to_owned()],
        }
    }

    /// Serializes the request into a body ready for the wire.
    pub fn to_body(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}

/// The parsed model answer.
///
/// Only `completion` is required; a body without it fails to decode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelResponse {
    pub completion: String,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn prompt_is_wrapped_verbatim() {
        let req = ModelRequest::from_utterance("  spaced  ");
        assert_eq!(req.prompt, "\n\nHuman:  spaced  \n\nAssistant:");
    }

    #[test]
    fn body_fields() {
        let body = ModelRequest::from_utterance("hi").to_body().unwrap();
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["prompt"], "\n\nHuman:hi\n\nAssistant:");
        assert_eq!(v["max_tokens_to_sample"], 4096);
        assert_eq!(v["temperature"], 0.5);
        assert_eq!(v["top_k"], 250);
        assert_eq!(v["top_p"], 1);
        assert!(std::str::from_utf8(&body).unwrap().contains(r#""top_p":1,"#));
        assert_eq!(v["stop_sequences"], json!(["\n\nHuman:"]));
    }

    #[test]
    fn response_with_completion() {
        let resp: ModelResponse = serde_json::from_value(json!({
            "completion": " 4",
            "stop_reason": "stop_sequence"
        }))
        .unwrap();
        assert_eq!(resp.completion, " 4");
        assert_eq!(resp.stop_reason.as_deref(), Some("stop_sequence"));
    }

    #[test]
    fn response_without_completion_fails() {
        let err = serde_json::from_value::<ModelResponse>(json!({ "stop_reason": "max_tokens" }));
        assert!(err.is_err());
    }
}
