//! # lexbridge
//!
//! A Lex V2 fulfillment code hook that answers each intent with a single
//! Bedrock text completion.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use lexbridge::{BedrockClient, BridgeConfig, RequestBridge};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BridgeConfig::from_env()?;
//!     let client = BedrockClient::from_region(config.region.clone()).await;
//!     let bridge = RequestBridge::new(Arc::new(client), &config);
//!
//!     let event = serde_json::json!({
//!         "inputTranscript": "What is 2+2?",
//!         "sessionId": "abc123",
//!         "sessionState": { "intent": { "name": "Ask", "state": "InProgress" } }
//!     });
//!     println!("{:?}", bridge.handle(event).await?);
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod lex;
pub mod llm;
pub mod logging;

// ── Local invoke server ───────────────────────────────────────────────────────
pub mod server;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use bridge::{BridgeError, FailurePolicy, RequestBridge};
pub use config::{BridgeConfig, ConfigError};
pub use lex::{FulfillmentResponse, IntentRequest};
pub use llm::{BedrockClient, InferenceClient, InferenceError};
pub use server::{InvokeServer, ServerError};
