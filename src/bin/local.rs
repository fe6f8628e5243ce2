//! Serves the bridge over HTTP for local development.
//!
//! ```text
//! lexbridge-local --listen 127.0.0.1:9000
//! curl -d @event.json localhost:9000/2015-03-31/functions/function/invocations
//! ```

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use lexbridge::logging::{self, LogFormat};
use lexbridge::{BedrockClient, BridgeConfig, InvokeServer, RequestBridge};

#[derive(Debug, Parser)]
#[command(name = "lexbridge-local", version, about = "Local invoke server for lexbridge")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:9000")]
    listen: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(LogFormat::Pretty);

    let config = BridgeConfig::from_env()?;
    info!(region = %config.region, model_id = %config.model_id, "configuration loaded");

    let client = BedrockClient::from_region(config.region.clone()).await;
    let bridge = Arc::new(RequestBridge::new(Arc::new(client), &config));

    InvokeServer::bind(&args.listen, bridge).await?.serve().await?;
    Ok(())
}
