//! Local invoke server.
//!
//! Serves the bridge over HTTP/1.1 the way the Lambda Runtime Interface
//! Emulator serves a function, so an event can be replayed with `curl`
//! without deploying anything.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::bridge::RequestBridge;

pub mod frame;
pub mod invoke;

use frame::{Reply, take_invocation};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// A listener bound to an address, forwarding every invocation to one bridge.
pub struct InvokeServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    bridge: Arc<RequestBridge>,
}

impl InvokeServer {
    /// # Errors
    ///
    /// [`ServerError::Bind`] if the address cannot be bound.
    pub async fn bind(addr: &str, bridge: Arc<RequestBridge>) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_owned(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            bridge,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections until the process exits. Each connection gets its
    /// own task; accept failures are logged and skipped.
    pub async fn serve(self) -> Result<(), ServerError> {
        info!(address = %self.local_addr, "invoke server listening");
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                    continue;
                }
            };
            let bridge = Arc::clone(&self.bridge);
            tokio::spawn(async move {
                if let Err(e) = serve_connection(stream, peer, &bridge).await {
                    warn!(peer = %peer, error = %e, "connection ended with error");
                }
            });
        }
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    bridge: &RequestBridge,
) -> std::io::Result<()> {
    let mut buf = BytesMut::with_capacity(4096);
    loop {
        match take_invocation(&mut buf) {
            Ok(Some(invocation)) => {
                let close = invocation.close;
                debug!(peer = %peer, method = %invocation.method, path = %invocation.path, "invocation");
                let reply = invoke::route(bridge, invocation).await;
                stream.write_all(&reply.encode(close)).await?;
                if close {
                    return Ok(());
                }
            }
            Ok(None) => {
                if stream.read_buf(&mut buf).await? == 0 {
                    debug!(peer = %peer, "peer closed connection");
                    return Ok(());
                }
            }
            Err(e) => {
                warn!(peer = %peer, error = %e, "rejecting request");
                stream.write_all(&Reply::from(&e).encode(true)).await?;
                return stream.shutdown().await;
            }
        }
    }
}
