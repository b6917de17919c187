//! Abstract request/response channel and an in-process implementation.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::router::{BridgeError, BridgeRouter};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("IPC channel closed")]
    Closed,

    #[error("IPC reply dropped before completion")]
    ReplyDropped,

    #[error("IPC invocation timed out after {0}ms")]
    Timeout(u64),

    #[error("IPC handler rejected request: {0}")]
    Rejected(String),
}

/// One round trip across the process boundary.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn invoke(&self, request: &str, payload: Value) -> Result<Value, TransportError>;
}

pub struct BridgeRequest {
    pub name: String,
    pub payload: Value,
    reply: oneshot::Sender<Result<Value, BridgeError>>,
}

/// Caller end of a bounded in-process channel.
#[derive(Clone)]
pub struct ChannelTransport {
    sender: mpsc::Sender<BridgeRequest>,
}

/// Create a bounded channel. Feed the receiver to [`serve`].
pub fn channel(capacity: usize) -> (ChannelTransport, mpsc::Receiver<BridgeRequest>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (ChannelTransport { sender }, receiver)
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn invoke(&self, request: &str, payload: Value) -> Result<Value, TransportError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(BridgeRequest {
                name: request.to_string(),
                payload,
                reply,
            })
            .await
            .map_err(|_| TransportError::Closed)?;

        match response.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(TransportError::Rejected(err.to_string())),
            Err(_) => Err(TransportError::ReplyDropped),
        }
    }
}

/// Serve requests until every sender is dropped. Each request runs on its own
/// task so a slow evaluation does not hold up the queue.
pub async fn serve(router: Arc<BridgeRouter>, mut receiver: mpsc::Receiver<BridgeRequest>) {
    info!("Desktop control bridge serving");
    while let Some(request) = receiver.recv().await {
        let router = router.clone();
        tokio::spawn(async move {
            let BridgeRequest {
                name,
                payload,
                reply,
            } = request;
            let result = router.handle(&name, payload).await;
            if reply.send(result).is_err() {
                debug!("Caller went away before reply to {}", name);
            }
        });
    }
    info!("Desktop control bridge stopped");
}
