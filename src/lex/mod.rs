//! Lex V2 code-hook event and response envelope.
//!
//! Only the fields the bridge reads or writes are typed. Everything else
//! is kept in `extra` maps so an intent (slots, confirmation state, ...)
//! round-trips through the handler untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Session attributes carried opaquely between turns.
pub type SessionAttributes = BTreeMap<String, String>;

/// The inbound code-hook event.
///
/// # Examples
///
/// ```
/// use lexbridge::lex::IntentRequest;
///
/// let event = serde_json::json!({
///     "inputTranscript": "hello",
///     "sessionId": "abc123",
///     "sessionState": { "intent": { "name": "Ask", "state": "InProgress" } }
/// });
/// let request: IntentRequest = serde_json::from_value(event).unwrap();
/// assert_eq!(request.input_transcript, "hello");
/// assert!(request.session_attributes().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    pub input_transcript: String,
    pub session_state: SessionState,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_attributes: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<SessionAttributes>,
    pub intent: Intent,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The recognized intent for the current turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<IntentState>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fulfillment state of an intent, as Lex V2 spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentState {
    Failed,
    Fulfilled,
    FulfillmentInProgress,
    InProgress,
    ReadyForFulfillment,
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogActionType {
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogAction {
    #[serde(rename = "type")]
    pub kind: DialogActionType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    PlainText,
    #[serde(rename = "SSML")]
    Ssml,
    CustomPayload,
}

/// A single message returned to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub content_type: ContentType,
    pub content: String,
}

impl Message {
    pub fn plain_text(content: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::PlainText,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSessionState {
    pub session_attributes: SessionAttributes,
    pub dialog_action: DialogAction,
    pub intent: Intent,
}

/// The close-turn envelope handed back to Lex.
///
/// `requestAttributes` is always written, as `null` when the event had none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentResponse {
    pub session_state: ResponseSessionState,
    pub messages: Vec<Message>,
    pub session_id: String,
    pub request_attributes: Option<BTreeMap<String, String>>,
}

impl IntentRequest {
    /// Returns the session attributes, or an empty map when the event has none.
    pub fn session_attributes(&self) -> SessionAttributes {
        self.session_state
            .session_attributes
            .clone()
            .unwrap_or_default()
    }

    /// Consumes the event and closes the turn with `state` and one `message`.
    ///
    /// The intent is carried over with only its state replaced; session id
    /// and request attributes pass through.
    pub fn close(
        self,
        session_attributes: SessionAttributes,
        state: IntentState,
        message: Message,
    ) -> FulfillmentResponse {
        let mut intent = self.session_state.intent;
        intent.state = Some(state);

        FulfillmentResponse {
            session_state: ResponseSessionState {
                session_attributes,
                dialog_action: DialogAction {
                    kind: DialogActionType::Close,
                },
                intent,
            },
            messages: vec![message],
            session_id: self.session_id,
            request_attributes: self.request_attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> Value {
        json!({
            "inputTranscript": "book a table",
            "sessionId": "s-1",
            "bot": { "name": "Diner", "version": "DRAFT" },
            "sessionState": {
                "sessionAttributes": { "party": "4" },
                "activeContexts": [],
                "intent": {
                    "name": "BookTable",
                    "state": "InProgress",
                    "confirmationState": "None",
                    "slots": { "time": null }
                }
            }
        })
    }

    #[test]
    fn session_attributes_present() {
        let req: IntentRequest = serde_json::from_value(event()).unwrap();
        let attrs = req.session_attributes();
        assert_eq!(attrs.get("party").map(String::as_str), Some("4"));
    }

    #[test]
    fn session_attributes_absent_is_empty() {
        let mut raw = event();
        raw["sessionState"]
            .as_object_mut()
            .unwrap()
            .remove("sessionAttributes");
        let req: IntentRequest = serde_json::from_value(raw).unwrap();
        assert!(req.session_attributes().is_empty());
        // accessor does not invent the field on the request
        assert!(req.session_state.session_attributes.is_none());
    }

    #[test]
    fn missing_transcript_is_rejected() {
        let mut raw = event();
        raw.as_object_mut().unwrap().remove("inputTranscript");
        assert!(serde_json::from_value::<IntentRequest>(raw).is_err());
    }

    #[test]
    fn missing_intent_is_rejected() {
        let mut raw = event();
        raw["sessionState"].as_object_mut().unwrap().remove("intent");
        assert!(serde_json::from_value::<IntentRequest>(raw).is_err());
    }

    #[test]
    fn close_preserves_intent_fields() {
        let req: IntentRequest = serde_json::from_value(event()).unwrap();
        let attrs = req.session_attributes();
        let resp = req.close(attrs, IntentState::Fulfilled, Message::plain_text("done"));
        let out = serde_json::to_value(&resp).unwrap();

        assert_eq!(out["sessionState"]["dialogAction"], json!({ "type": "Close" }));
        assert_eq!(out["sessionState"]["intent"]["state"], "Fulfilled");
        assert_eq!(out["sessionState"]["intent"]["confirmationState"], "None");
        assert_eq!(out["sessionState"]["intent"]["slots"], json!({ "time": null }));
        assert_eq!(out["sessionState"]["sessionAttributes"], json!({ "party": "4" }));
        assert_eq!(
            out["messages"],
            json!([{ "contentType": "PlainText", "content": "done" }])
        );
        assert_eq!(out["sessionId"], "s-1");
        assert_eq!(out["requestAttributes"], Value::Null);
    }

    #[test]
    fn close_passes_request_attributes() {
        let mut raw = event();
        raw["requestAttributes"] = json!({ "x-amz-lex:channel": "web" });
        let req: IntentRequest = serde_json::from_value(raw).unwrap();
        let resp = req.close(
            SessionAttributes::new(),
            IntentState::Fulfilled,
            Message::plain_text("ok"),
        );
        let out = serde_json::to_value(&resp).unwrap();
        assert_eq!(out["requestAttributes"], json!({ "x-amz-lex:channel": "web" }));
    }
}
