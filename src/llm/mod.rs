//! LLM integration — prompt templating and the inference endpoint seam.
//!
//! [`InferenceClient`] is the single outbound call the bridge makes. The
//! production implementation is [`BedrockClient`]; tests substitute their
//! own.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod bedrock;
pub mod prompt;

pub use bedrock::BedrockClient;
pub use prompt::{ModelRequest, ModelResponse};

/// Content type and accept header for the model body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Errors returned by an [`InferenceClient`].
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The endpoint answered with an error: bad credentials, throttling,
    /// validation failure, model not ready, service unavailable.
    #[error("inference service error {code}: {message}")]
    Service { code: String, message: String },

    /// The request never got a service answer (dispatch, timeout, or an
    /// unparseable response).
    #[error("inference transport error: {0}")]
    Transport(String),

    #[error("failed to serialize model request: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl InferenceError {
    /// Returns `true` for service-level errors, the only kind the bridge absorbs.
    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service { .. })
    }
}

/// A synchronous text-generation endpoint.
///
/// Implementations are constructed once per process and shared across
/// invocations, so they must be `Send + Sync`.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Sends `body` to `model_id` and returns the raw response body.
    async fn invoke_model(&self, model_id: &str, body: Bytes) -> Result<Bytes, InferenceError>;
}
