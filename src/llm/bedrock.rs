//! Amazon Bedrock runtime client.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::primitives::Blob;
use bytes::Bytes;
use tracing::debug;

use super::{InferenceClient, InferenceError, JSON_CONTENT_TYPE};

/// [`InferenceClient`] backed by Bedrock `InvokeModel`.
///
/// SDK retries are disabled; a failed call surfaces immediately.
#[derive(Debug, Clone)]
pub struct BedrockClient {
    inner: Client,
}

impl BedrockClient {
    /// Loads credentials from the default provider chain and pins the region.
    pub async fn from_region(region: impl Into<String>) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.into()))
            .retry_config(RetryConfig::disabled())
            .load()
            .await;
        Self::new(Client::new(&sdk_config))
    }

    pub fn new(inner: Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl InferenceClient for BedrockClient {
    async fn invoke_model(&self, model_id: &str, body: Bytes) -> Result<Bytes, InferenceError> {
        debug!(model_id, bytes = body.len(), "invoking model");

        let output = self
            .inner
            .invoke_model()
            .model_id(model_id)
            .content_type(JSON_CONTENT_TYPE)
            .accept(JSON_CONTENT_TYPE)
            .body(Blob::new(body.to_vec()))
            .send()
            .await
            .map_err(|err| match err {
                SdkError::ServiceError(context) => {
                    let service = context.into_err();
                    InferenceError::Service {
                        code: service.code().unwrap_or("Unknown").to_owned(),
                        message: service.message().unwrap_or_default().to_owned(),
                    }
                }
                other => InferenceError::Transport(DisplayErrorContext(&other).to_string()),
            })?;

        Ok(Bytes::copy_from_slice(output.body().as_ref()))
    }
}
