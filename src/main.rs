//! Lambda entry point.

use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::info;

use lexbridge::logging::{self, LogFormat};
use lexbridge::{BedrockClient, BridgeConfig, RequestBridge};

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init(LogFormat::Json);

    let config = BridgeConfig::from_env()?;
    info!(region = %config.region, model_id = %config.model_id, "starting lexbridge");

    let client = BedrockClient::from_region(config.region.clone()).await;
    let bridge = Arc::new(RequestBridge::new(Arc::new(client), &config));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let bridge = Arc::clone(&bridge);
        async move { bridge.handle(event.payload).await.map_err(Error::from) }
    }))
    .await
}
