//! The request bridge: Lex intent event in, Bedrock completion out.
//!
//! One invocation makes exactly one model call. A service-level failure
//! of that call is absorbed according to [`FailurePolicy`]; every other
//! failure is returned to the caller as a [`BridgeError`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::config::BridgeConfig;
use crate::lex::{FulfillmentResponse, IntentRequest, IntentState, Message};
use crate::llm::{InferenceClient, InferenceError, ModelRequest, ModelResponse};

/// Text returned under [`FailurePolicy::Apologize`].
pub const APOLOGY: &str = "Sorry, I couldn't process that request right now. Please try again.";

/// What to hand back to Lex when the model endpoint rejects the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the error and return nothing. Lex reports the invocation as failed.
    #[default]
    Silent,
    /// Close the turn with a `Failed` intent and an apology message.
    Apologize,
}

/// Errors that escape [`RequestBridge::handle`].
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("malformed intent event: {0}")]
    Event(#[source] serde_json::Error),

    #[error("malformed model response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl BridgeError {
    /// Short error name, used as `errorType` in Lambda-style error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Event(_) => "EventError",
            Self::Decode(_) => "DecodeError",
            Self::Inference(_) => "InferenceError",
        }
    }
}

/// Turns intent events into fulfillment responses.
///
/// Built once at process start; cheap to share behind an [`Arc`].
pub struct RequestBridge {
    client: Arc<dyn InferenceClient>,
    model_id: String,
    failure_policy: FailurePolicy,
}

impl RequestBridge {
    pub fn new(client: Arc<dyn InferenceClient>, config: &BridgeConfig) -> Self {
        Self {
            client,
            model_id: config.model_id.clone(),
            failure_policy: config.on_model_error,
        }
    }

    /// Handles a raw event as delivered by the runtime.
    ///
    /// Returns `Ok(None)` when the model call failed with a service error
    /// under [`FailurePolicy::Silent`].
    ///
    /// # Errors
    ///
    /// - [`BridgeError::Event`] — `inputTranscript`, `sessionState.intent`
    ///   or `sessionId` is missing or mistyped.
    /// - [`BridgeError::Decode`] — the model body is not JSON or has no `completion`.
    /// - [`BridgeError::Inference`] — the call failed below the service layer.
    pub async fn handle(&self, event: Value) -> Result<Option<FulfillmentResponse>, BridgeError> {
        info!(event = %event, "received intent event");
        let request: IntentRequest = serde_json::from_value(event).map_err(BridgeError::Event)?;
        self.handle_request(request).await
    }

    /// Handles an already-parsed event. See [`handle`](Self::handle).
    pub async fn handle_request(
        &self,
        request: IntentRequest,
    ) -> Result<Option<FulfillmentResponse>, BridgeError> {
        let body = ModelRequest::from_utterance(&request.input_transcript)
            .to_body()
            .map_err(InferenceError::from)?;

        let raw = match self.client.invoke_model(&self.model_id, body).await {
            Ok(raw) => raw,
            Err(err) if err.is_service() => {
                error!(
                    model_id = %self.model_id,
                    session_id = %request.session_id,
                    error = %err,
                    "model invocation failed"
                );
                return Ok(self.on_failure(request));
            }
            Err(err) => return Err(err.into()),
        };

        let body: Value = serde_json::from_slice(&raw).map_err(BridgeError::Decode)?;
        info!(body = %body, "model response");
        let response: ModelResponse = serde_json::from_value(body).map_err(BridgeError::Decode)?;
        if let Some(stop_reason) = &response.stop_reason {
            info!(stop_reason = %stop_reason, "completion finished");
        }

        let session_attributes = request.session_attributes();
        Ok(Some(request.close(
            session_attributes,
            IntentState::Fulfilled,
            Message::plain_text(response.completion),
        )))
    }

    fn on_failure(&self, request: IntentRequest) -> Option<FulfillmentResponse> {
        match self.failure_policy {
            FailurePolicy::Silent => None,
            FailurePolicy::Apologize => {
                let session_attributes = request.session_attributes();
                Some(request.close(
                    session_attributes,
                    IntentState::Failed,
                    Message::plain_text(APOLOGY),
                ))
            }
        }
    }
}
