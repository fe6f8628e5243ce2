//! Invoke routes.
//!
//! A suppressed model failure comes back as `200` with a `null` body, which
//! is what Lambda returns for a handler that produced nothing.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::frame::{Invocation, Reply, Status};
use crate::bridge::RequestBridge;

/// Lambda Runtime Interface Emulator invocation path.
pub const RIE_INVOKE_PATH: &str = "/2015-03-31/functions/function/invocations";
/// Short alias for [`RIE_INVOKE_PATH`].
pub const INVOKE_PATH: &str = "/invoke";
pub const HEALTH_PATH: &str = "/health";

/// Lambda-style error body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvokeError<'a> {
    error_type: &'a str,
    error_message: String,
}

pub async fn route(bridge: &RequestBridge, invocation: Invocation) -> Reply {
    match (invocation.method.as_str(), invocation.path.as_str()) {
        ("POST", RIE_INVOKE_PATH | INVOKE_PATH) => invoke(bridge, &invocation.payload).await,
        ("GET", HEALTH_PATH) => Reply::text(Status::Ok, "ok"),
        (_, RIE_INVOKE_PATH | INVOKE_PATH | HEALTH_PATH) => {
            Reply::text(Status::MethodNotAllowed, "method not allowed")
        }
        _ => Reply::text(Status::NotFound, "not found"),
    }
}

async fn invoke(bridge: &RequestBridge, payload: &[u8]) -> Reply {
    let event: Value = match serde_json::from_slice(payload) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "invocation payload is not JSON");
            return Reply::json(
                Status::BadRequest,
                &InvokeError {
                    error_type: "InvalidRequestContent",
                    error_message: e.to_string(),
                },
            );
        }
    };

    match bridge.handle(event).await {
        Ok(response) => {
            info!(fulfilled = response.is_some(), "invocation complete");
            Reply::json(Status::Ok, &response)
        }
        Err(e) => {
            warn!(error = %e, kind = e.kind(), "invocation failed");
            Reply::json(
                Status::InternalServerError,
                &InvokeError {
                    error_type: e.kind(),
                    error_message: e.to_string(),
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::json;

    use crate::config::BridgeConfig;
    use crate::llm::{InferenceClient, InferenceError};

    /// Completes every prompt with the prompt itself.
    struct Echo;

    #[async_trait]
    impl InferenceClient for Echo {
        async fn invoke_model(&self, _: &str, body: Bytes) -> Result<Bytes, InferenceError> {
            let sent: Value = serde_json::from_slice(&body)?;
            let completion = json!({ "completion": sent["prompt"] });
            Ok(Bytes::from(serde_json::to_vec(&completion)?))
        }
    }

    fn bridge() -> RequestBridge {
        RequestBridge::new(Arc::new(Echo), &BridgeConfig::default())
    }

    fn invocation(method: &str, path: &str, payload: &'static str) -> Invocation {
        Invocation {
            method: method.to_owned(),
            path: path.to_owned(),
            close: true,
            payload: Bytes::from_static(payload.as_bytes()),
        }
    }

    fn body_json(reply: &Reply) -> Value {
        serde_json::from_slice(&reply.body).unwrap()
    }

    const EVENT: &str = r#"{"inputTranscript":"hi","sessionId":"s","sessionState":{"intent":{"name":"Greet"}}}"#;

    #[tokio::test]
    async fn invokes_on_both_paths() {
        for path in [RIE_INVOKE_PATH, INVOKE_PATH] {
            let reply = route(&bridge(), invocation("POST", path, EVENT)).await;
            assert_eq!(reply.status, Status::Ok);
            let out = body_json(&reply);
            assert_eq!(out["messages"][0]["content"], "\n\nHuman:hi\n\nAssistant:");
            assert_eq!(out["sessionState"]["intent"]["state"], "Fulfilled");
        }
    }

    #[tokio::test]
    async fn non_json_payload_is_400() {
        let reply = route(&bridge(), invocation("POST", INVOKE_PATH, "not json")).await;
        assert_eq!(reply.status, Status::BadRequest);
        assert_eq!(body_json(&reply)["errorType"], "InvalidRequestContent");
    }

    #[tokio::test]
    async fn bad_event_is_500() {
        let reply = route(&bridge(), invocation("POST", INVOKE_PATH, r#"{"sessionId":"s"}"#)).await;
        assert_eq!(reply.status, Status::InternalServerError);
        assert_eq!(body_json(&reply)["errorType"], "EventError");
    }

    #[tokio::test]
    async fn health_and_unknown_routes() {
        let reply = route(&bridge(), invocation("GET", HEALTH_PATH, "")).await;
        assert_eq!(reply.status, Status::Ok);

        let reply = route(&bridge(), invocation("GET", INVOKE_PATH, "")).await;
        assert_eq!(reply.status, Status::MethodNotAllowed);

        let reply = route(&bridge(), invocation("GET", "/nope", "")).await;
        assert_eq!(reply.status, Status::NotFound);
    }
}
